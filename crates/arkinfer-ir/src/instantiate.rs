//! Generic instantiation.
//!
//! [`replace_type_with_real`] substitutes the real type arguments of a call
//! or a receiver into a type that mentions generic parameters by index.
//! [`replace_class_generics`] substitutes by generic *name*, which is how a
//! receiver's class-level arguments reach a method signature that also has
//! its own method-level generics.
//!
//! Both are idempotent: once a generic has been replaced it is gone, so a
//! second substitution with the same arguments changes nothing.

use std::rc::Rc;

use arkinfer_common::{DepthCounter, RecursionProfile};
use tracing::trace;

use crate::signature::{MethodParameter, MethodSignature};
use crate::types::{AliasType, ArrayType, ClassType, FunctionType, GenericType, Type, UnionType};

/// Substitutes `real` into `ty` by generic index.
///
/// - `Generic(i)` becomes `real[i]`, else its default, else its constraint.
/// - `Any` becomes `real[0]` when present.
/// - Class and function types map their own real argument list, or take
///   `real` when they have none.
/// - Unions and arrays substitute into their members.
/// - Aliases substitute into the innermost non-alias original, updating the
///   shared alias in place.
pub fn replace_type_with_real(ty: &Type, real: Option<&[Type]>) -> Type {
    let mut depth = DepthCounter::with_profile(RecursionProfile::Instantiation);
    let result = replace_inner(ty, real, &mut depth);
    if depth.is_exceeded() {
        trace!(ty = %ty, "instantiation depth limit reached");
    }
    result
}

fn replace_inner(ty: &Type, real: Option<&[Type]>, depth: &mut DepthCounter) -> Type {
    if !depth.enter() {
        return ty.clone();
    }
    let result = replace_step(ty, real, depth);
    depth.leave();
    result
}

fn replace_step(ty: &Type, real: Option<&[Type]>, depth: &mut DepthCounter) -> Type {
    match ty {
        Type::Generic(generic) => real
            .and_then(|r| r.get(generic.index))
            .or(generic.default.as_deref())
            .or(generic.constraint.as_deref())
            .cloned()
            .unwrap_or_else(|| ty.clone()),
        Type::Any => real
            .and_then(|r| r.first())
            .cloned()
            .unwrap_or(Type::Any),
        Type::Class(class) => {
            match replace_generic_list(class.real_generic_types.as_deref(), real, depth) {
                Some(types) => Type::Class(ClassType {
                    signature: class.signature.clone(),
                    real_generic_types: Some(types),
                }),
                None => ty.clone(),
            }
        }
        Type::Function(func) => {
            match replace_generic_list(func.real_generic_types.as_deref(), real, depth) {
                Some(types) => Type::Function(FunctionType {
                    signature: func.signature.clone(),
                    real_generic_types: Some(types),
                }),
                None => ty.clone(),
            }
        }
        Type::Union(union) if real.is_some() => Type::Union(UnionType {
            types: ty
                .flat_types()
                .iter()
                .map(|t| replace_inner(t, real, depth))
                .collect(),
            current: union
                .current
                .as_ref()
                .map(|c| Box::new(replace_inner(c, real, depth))),
        }),
        Type::Array(array) if real.is_some() => Type::Array(ArrayType {
            base: Box::new(replace_inner(&array.base, real, depth)),
            dimension: array.dimension,
        }),
        Type::Alias(alias) if real.is_some() => {
            replace_in_alias_chain(alias, real, depth);
            ty.clone()
        }
        _ => ty.clone(),
    }
}

/// Maps an existing real argument list, or adopts `real` when there is none.
/// `None` means "leave the type as is".
fn replace_generic_list(
    own: Option<&[Type]>,
    real: Option<&[Type]>,
    depth: &mut DepthCounter,
) -> Option<Vec<Type>> {
    let types = match own {
        Some(own) => own.iter().map(|t| replace_inner(t, real, depth)).collect(),
        None => real?.to_vec(),
    };
    if types.is_empty() { None } else { Some(types) }
}

fn replace_in_alias_chain(alias: &Rc<AliasType>, real: Option<&[Type]>, depth: &mut DepthCounter) {
    let original = alias.original_type().clone();
    match &original {
        Type::Alias(inner) => {
            if !Rc::ptr_eq(inner, alias) && depth.enter() {
                replace_in_alias_chain(inner, real, depth);
                depth.leave();
            }
        }
        _ => {
            let replaced = replace_inner(&original, real, depth);
            if replaced != original {
                alias.set_original_type(replaced);
            }
        }
    }
}

// =============================================================================
// Substitution by name
// =============================================================================

/// Replaces generics named in `generics` with the positional `real` type
/// arguments of a receiver (`List<number>` receiver: `T` becomes `number`).
///
/// Aliases are not mutated; a detached copy with the substituted original
/// is returned instead, since the receiver's arguments are use-site data.
pub fn replace_class_generics(ty: &Type, generics: &[GenericType], real: &[Type]) -> Type {
    let mut depth = DepthCounter::with_profile(RecursionProfile::Instantiation);
    let result = replace_named(ty, generics, real, &mut depth);
    if depth.is_exceeded() {
        trace!(ty = %ty, "instantiation depth limit reached");
    }
    result
}

fn replace_named(ty: &Type, generics: &[GenericType], real: &[Type], depth: &mut DepthCounter) -> Type {
    if generics.is_empty() || real.is_empty() || !depth.enter() {
        return ty.clone();
    }
    let map = |t: &Type, depth: &mut DepthCounter| replace_named(t, generics, real, depth);
    let result = match ty {
        Type::Generic(generic) => generics
            .iter()
            .position(|g| g.name == generic.name)
            .and_then(|i| real.get(i))
            .cloned()
            .unwrap_or_else(|| ty.clone()),
        Type::Class(class) => Type::Class(ClassType {
            signature: class.signature.clone(),
            real_generic_types: class
                .real_generic_types
                .as_ref()
                .map(|types| types.iter().map(|t| map(t, depth)).collect()),
        }),
        Type::Function(func) => Type::Function(FunctionType {
            signature: Box::new(replace_signature_generics_at(&func.signature, generics, real, depth)),
            real_generic_types: func
                .real_generic_types
                .as_ref()
                .map(|types| types.iter().map(|t| map(t, depth)).collect()),
        }),
        Type::Union(union) => Type::Union(UnionType {
            types: union.types.iter().map(|t| map(t, depth)).collect(),
            current: union.current.as_ref().map(|c| Box::new(map(c, depth))),
        }),
        Type::Array(array) => Type::Array(ArrayType {
            base: Box::new(map(&array.base, depth)),
            dimension: array.dimension,
        }),
        Type::Alias(alias) => {
            let original = alias.original_type().clone();
            let replaced = map(&original, depth);
            if replaced == original {
                ty.clone()
            } else {
                let mut detached = AliasType::new(alias.name.clone(), replaced, alias.signature.clone())
                    .with_generics(alias.generic_types.clone());
                detached.real_generic_types = Some(real.to_vec());
                Type::Alias(Rc::new(detached))
            }
        }
        _ => ty.clone(),
    };
    depth.leave();
    result
}

/// Applies [`replace_class_generics`] to every parameter and the return type
/// of `signature`.
pub fn replace_signature_generics(
    signature: &MethodSignature,
    generics: &[GenericType],
    real: &[Type],
) -> MethodSignature {
    let mut depth = DepthCounter::with_profile(RecursionProfile::Instantiation);
    replace_signature_generics_at(signature, generics, real, &mut depth)
}

fn replace_signature_generics_at(
    signature: &MethodSignature,
    generics: &[GenericType],
    real: &[Type],
    depth: &mut DepthCounter,
) -> MethodSignature {
    let mut result = signature.clone();
    result.sub.parameters = signature
        .sub
        .parameters
        .iter()
        .map(|p| MethodParameter {
            ty: replace_named(&p.ty, generics, real, depth),
            ..p.clone()
        })
        .collect();
    result.sub.return_type = replace_named(&signature.sub.return_type, generics, real, depth);
    result
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
