//! Field reference resolution.

use arkinfer_common::names;
use arkinfer_ir::model::{ClassMember, Constant, FieldCategory, LocalId, Ref, Value};
use arkinfer_ir::{BaseSignature, FieldSignature, Type};

use crate::state::{InferenceState, Scope};

impl<'a> InferenceState<'a> {
    /// Resolves `base.field` against the type of `base`.
    ///
    /// An array receiver turns the reference into an element access unless
    /// the name is `length`. A union receiver tries its non-nullish members
    /// in order and keeps the first one giving a resolved field type. The
    /// reference becomes a static field reference when the member found is
    /// static or belongs to a namespace or a default class.
    pub fn infer_field_ref(&mut self, base: LocalId, field: &FieldSignature, scope: Scope) -> Option<Ref> {
        let scene = self.scene;
        if is_settled(field) {
            return None;
        }
        let base_ty = scene.local(base)?.ty().clone().unwrap_alias();
        if matches!(base_ty, Type::Array(_)) && field.name != names::ARRAY_LENGTH_NAME {
            return Some(Ref::Array {
                base,
                index: self.index_value(&field.name, scope),
            });
        }

        let candidates: Vec<Type> = match &base_ty {
            Type::Union(union) => union
                .current
                .iter()
                .map(|c| (**c).clone())
                .chain(union.types.iter().filter(|t| !t.is_nullish()).cloned())
                .collect(),
            other => vec![other.clone()],
        };

        let mut fallback = None;
        for candidate in &candidates {
            let Some(signature) = self.generate_new_field_signature(field, candidate, scope) else {
                continue;
            };
            let resolved = !signature.ty.is_unclear();
            let reference = if signature.is_static {
                Ref::StaticField { field: signature }
            } else {
                Ref::InstanceField {
                    base,
                    field: signature,
                }
            };
            if resolved {
                return Some(reference);
            }
            fallback.get_or_insert(reference);
        }
        // Never trade a resolved type for an unclear one.
        if !field.ty.is_unclear() {
            return None;
        }
        fallback
    }

    /// Resolves `Name.field` where `Name` is a class, namespace or module.
    pub fn infer_static_field_ref(&mut self, field: &FieldSignature, scope: Scope) -> Option<Ref> {
        if is_settled(field) {
            return None;
        }
        let base_ty = match &field.declaring {
            BaseSignature::Class(class) if class.file.is_unknown() => {
                if class.name == names::UNKNOWN_CLASS_NAME {
                    return None;
                }
                self.infer_unclear_ref_name(&class.name, scope)?
            }
            BaseSignature::Class(class) => Type::class(class.clone()),
            BaseSignature::Namespace(ns) => Type::namespace(ns.clone()),
        };
        let signature = self.generate_new_field_signature(field, &base_ty, scope)?;
        if signature.ty.is_unclear() && !field.ty.is_unclear() {
            return None;
        }
        Some(Ref::StaticField { field: signature })
    }

    /// The signature `field` denotes on `base`, with the member's type
    /// instantiated for the receiver.
    fn generate_new_field_signature(&mut self, field: &FieldSignature, base: &Type, scope: Scope) -> Option<FieldSignature> {
        let scene = self.scene;
        let (member, ty) = self.infer_field_type(base, &field.name, scope)?;
        match member {
            Some(ClassMember::Field(id)) => {
                let ark_field = scene.field(id)?;
                let class = scene.class(ark_field.declaring_class)?;
                let mut signature = ark_field.signature().clone();
                signature.ty = if ark_field.category == FieldCategory::EnumMember && ty.is_unclear() {
                    Type::class(class.signature.clone())
                } else {
                    ty
                };
                signature.is_static |= class.is_default();
                Some(signature)
            }
            Some(ClassMember::Method(id)) => {
                let method = scene.method(id)?;
                let class = scene.class(method.declaring_class)?;
                Some(FieldSignature::new(
                    field.name.clone(),
                    BaseSignature::Class(class.signature.clone()),
                    ty,
                    method.is_static() || class.is_default(),
                ))
            }
            Some(ClassMember::Export(_)) | None => {
                let declaring = match base.unwrap_alias() {
                    Type::Class(class) => BaseSignature::Class(class.signature),
                    Type::Annotation(annotation) => BaseSignature::Namespace(annotation.namespace),
                    _ => field.declaring.clone(),
                };
                let is_static = match &declaring {
                    BaseSignature::Namespace(_) => true,
                    BaseSignature::Class(class) => class.is_default() || field.is_static,
                };
                Some(FieldSignature::new(field.name.clone(), declaring, ty, is_static))
            }
        }
    }

    /// Index operand for `arr.name`: a numeric constant, a local of the
    /// scope method with that name, else the name as a string constant.
    fn index_value(&self, name: &str, scope: Scope) -> Value {
        if name.parse::<f64>().is_ok() {
            return Value::Constant(Constant::number(name));
        }
        let local = scope
            .method
            .and_then(|m| self.scene.method(m)?.body()?.local(name));
        match local {
            Some(id) => Value::Local(id),
            None => Value::Constant(Constant::string(name)),
        }
    }
}

/// A reference whose owner and type are both resolved needs no more work.
fn is_settled(field: &FieldSignature) -> bool {
    let owner_known = match &field.declaring {
        BaseSignature::Class(class) => !class.file.is_unknown(),
        BaseSignature::Namespace(ns) => !ns.file.is_unknown(),
    };
    owner_known && !field.ty.is_unclear()
}

#[cfg(test)]
#[path = "../tests/field_ref_tests.rs"]
mod tests;
