//! Unclear-type inference and name resolution.
//!
//! Names are resolved from a [`Scope`] in this order: `this`/`super`, locals
//! of the enclosing methods (innermost first), classes, namespaces and
//! functions of the enclosing namespaces and file, type aliases, imports of
//! the file, and finally the SDK global table. A name that is imported is
//! never looked up in the SDK table, even when the import cannot be resolved.

use smallvec::SmallVec;
use tracing::trace;

use arkinfer_common::diagnostics::diagnostic_messages;
use arkinfer_common::names::{self, builtin};
use arkinfer_common::{RecursionGuard, RecursionProfile, limits};
use arkinfer_ir::model::{ClassId, ClassMember, DeclOwner, ExportTarget, MethodBody};
use arkinfer_ir::{
    AnnotationNamespaceType, ArrayType, ClassType, FunctionType, GenericType, NamespaceSignature,
    Type, UnionType, replace_class_generics,
};

use crate::state::{InferenceState, Scope};

// =============================================================================
// Unclear types
// =============================================================================

impl<'a> InferenceState<'a> {
    /// Tries to turn an unclear type into a resolved one.
    ///
    /// Returns `None` when nothing could be improved; the caller keeps the
    /// original type. Aliases are resolved in place and returned as is.
    /// `hint` is the type of the value being assigned, used to select the
    /// current member of a union.
    pub fn infer_uncleared_type(&mut self, ty: &Type, scope: Scope, hint: Option<&Type>) -> Option<Type> {
        self.infer_uncleared_type_at(ty, scope, hint, 0)
    }

    fn infer_uncleared_type_at(&mut self, ty: &Type, scope: Scope, hint: Option<&Type>, depth: u32) -> Option<Type> {
        if depth > limits::MAX_ALIAS_CHAIN_DEPTH {
            self.report_recursion_limit(scope, &ty.to_string());
            return None;
        }
        match ty {
            Type::Class(class) if class.signature.file.is_unknown() => {
                let resolved = self.infer_unclear_ref_name(&class.signature.name, scope)?;
                let args = class.real_generic_types.clone().unwrap_or_default();
                Some(self.apply_real_generics(resolved, &args, scope))
            }
            Type::UnclearReference(reference) => {
                let resolved = self.infer_unclear_ref_name(&reference.name, scope)?;
                Some(self.apply_real_generics(resolved, &reference.generic_types, scope))
            }
            Type::Union(union) => {
                let mut improved = false;
                let mut types = Vec::with_capacity(union.types.len());
                for member in &union.types {
                    if member.is_nullish() || !member.is_unclear() {
                        types.push(member.clone());
                        continue;
                    }
                    match self.infer_uncleared_type_at(member, scope, None, depth + 1) {
                        Some(resolved) => {
                            improved = true;
                            types.push(resolved);
                        }
                        None => types.push(member.clone()),
                    }
                }
                let current = hint
                    .and_then(|h| union_member_matching(&types, h))
                    .map(Box::new)
                    .or_else(|| union.current.clone());
                if !improved && current == union.current {
                    return None;
                }
                Some(Type::Union(UnionType { types, current }))
            }
            Type::Array(array) => {
                let base = self.infer_uncleared_type_at(&array.base, scope, None, depth + 1)?;
                Some(Type::Array(ArrayType {
                    base: Box::new(base),
                    dimension: array.dimension,
                }))
            }
            Type::Alias(alias) => {
                let original = alias.original_type().clone();
                if !original.is_unclear() {
                    return None;
                }
                let resolved = self.infer_uncleared_type_at(&original, scope, hint, depth + 1)?;
                if resolved != original {
                    alias.set_original_type(resolved);
                    self.mark_changed();
                }
                Some(ty.clone())
            }
            Type::Annotation(annotation) if annotation.is_unbound() => {
                match self.infer_unclear_ref_name(&annotation.origin_name, scope)? {
                    resolved @ Type::Annotation(_) => Some(resolved),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Applies explicit type arguments to a resolved type.
    fn apply_real_generics(&mut self, resolved: Type, args: &[Type], scope: Scope) -> Type {
        if args.is_empty() {
            return resolved;
        }
        let mut reals = Vec::with_capacity(args.len());
        for arg in args {
            let real = if arg.is_unclear() {
                self.infer_uncleared_type(arg, scope, None)
                    .unwrap_or_else(|| arg.clone())
            } else {
                arg.clone()
            };
            reals.push(real);
        }
        match resolved {
            Type::Class(class) => Type::Class(ClassType {
                signature: class.signature,
                real_generic_types: Some(reals),
            }),
            Type::Function(func) => Type::Function(FunctionType {
                signature: func.signature,
                real_generic_types: Some(reals),
            }),
            Type::Alias(alias) => {
                let generics = alias.generic_types.clone();
                replace_class_generics(&Type::Alias(alias), &generics, &reals)
            }
            other => other,
        }
    }

    /// Resolves the unclear constraints and defaults of a generic list.
    pub fn infer_generic_types(&mut self, generics: &[GenericType], scope: Scope) -> Option<Vec<GenericType>> {
        let mut improved = false;
        let mut result = generics.to_vec();
        for generic in &mut result {
            for slot in [&mut generic.constraint, &mut generic.default] {
                let Some(ty) = slot.as_deref() else {
                    continue;
                };
                if !ty.is_unclear() {
                    continue;
                }
                if let Some(resolved) = self.infer_uncleared_type(ty, scope, None) {
                    *slot = Some(Box::new(resolved));
                    improved = true;
                }
            }
        }
        improved.then_some(result)
    }
}

/// The member of a union an assigned value selects.
fn union_member_matching(types: &[Type], hint: &Type) -> Option<Type> {
    if hint.is_nullish() {
        return None;
    }
    types
        .iter()
        .find(|member| match (member, hint) {
            (Type::Class(a), Type::Class(b)) => a.signature == b.signature,
            _ => member.is_same_variant(hint),
        })
        .cloned()
}

// =============================================================================
// Name resolution
// =============================================================================

impl<'a> InferenceState<'a> {
    /// Resolves a possibly dotted, possibly generic type name
    /// (`ns.Foo<number>[]`). Fails as a whole if any segment fails.
    pub fn infer_unclear_ref_name(&mut self, name: &str, scope: Scope) -> Option<Type> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if let Some(element) = name.strip_suffix("[]") {
            return Some(match self.infer_unclear_ref_name(element, scope)? {
                Type::Array(array) => Type::array(*array.base, array.dimension + 1),
                other => Type::array(other, 1),
            });
        }
        if name == "unknown" {
            return None;
        }
        if let Some(primitive) = primitive_type(name) {
            return Some(primitive);
        }

        let mut current: Option<Type> = None;
        for segment in split_qualified_name(name) {
            let (segment_name, args) = split_generic_suffix(segment);
            let ty = match &current {
                None => self.infer_first_segment(segment_name, scope)?,
                Some(base) => self.infer_field_type(base, segment_name, scope)?.1,
            };
            let ty = if args.is_empty() {
                ty
            } else {
                let mut reals = Vec::with_capacity(args.len());
                for arg in args {
                    let real = self
                        .infer_unclear_ref_name(arg, scope)
                        .unwrap_or_else(|| Type::unclear(arg));
                    reals.push(real);
                }
                self.apply_real_generics(ty, &reals, scope)
            };
            current = Some(ty);
        }
        trace!(name, resolved = ?current.as_ref().map(ToString::to_string), "unclear name");
        current
    }

    fn infer_first_segment(&mut self, name: &str, scope: Scope) -> Option<Type> {
        if let Some(generic) = self.generic_in_scope(name, scope) {
            return Some(Type::Generic(generic));
        }
        self.infer_base_type(name, scope)
    }

    /// A generic parameter of the enclosing methods or class named `name`.
    fn generic_in_scope(&self, name: &str, scope: Scope) -> Option<GenericType> {
        let scene = self.scene;
        let mut current = scope.method;
        let mut depth = 0;
        while let Some(id) = current {
            let method = scene.method(id)?;
            if let Some(generic) = method.generic_types().iter().find(|g| g.name == name) {
                return Some(generic.clone());
            }
            depth += 1;
            if depth > limits::MAX_NAME_RESOLUTION_DEPTH {
                break;
            }
            current = method.outer_method;
        }
        let class = scene.class(scope.class)?;
        let generics = class.generic_types();
        generics.iter().find(|g| g.name == name).cloned()
    }

    /// Resolves the first segment of a name.
    pub fn infer_base_type(&mut self, name: &str, scope: Scope) -> Option<Type> {
        let scene = self.scene;
        match name {
            names::THIS_NAME => return scene.class(scope.class).map(|c| c.class_type()),
            names::SUPER_NAME => {
                let super_class = self.super_class_of(scope.class)?;
                return scene.class(super_class).map(|c| Type::class(c.signature.clone()));
            }
            _ => {}
        }
        if let Some(ty) = self.local_type_in_scope(name, scope) {
            return Some(ty);
        }
        if let Some(id) = scene.find_class_in_scope(name, scope.class) {
            return scene.class(id).map(|c| Type::class(c.signature.clone()));
        }
        if let Some(id) = scene.find_namespace_in_scope(name, scope.class) {
            return scene.namespace(id).map(|ns| Type::namespace(ns.signature.clone()));
        }
        if let Some(id) = scene.find_function_in_scope(name, scope.class) {
            return scene.method(id)?.signature().map(Type::function);
        }
        if let Some(alias) = scene.find_alias_in_scope(name, scope.method, scope.class) {
            return Some(Type::Alias(alias));
        }
        let file = scene.class(scope.class)?.declaring_file;
        if let Some(import) = scene.find_import(file, name) {
            let target = scene.resolve_import(import)?;
            return self.parse_export_to_type(&target);
        }
        let target = scene.get_sdk_global(name)?;
        self.parse_export_to_type(target)
    }

    /// The resolved type of a local named `name` in the enclosing methods,
    /// then in the default methods of the enclosing namespaces and file.
    fn local_type_in_scope(&self, name: &str, scope: Scope) -> Option<Type> {
        let scene = self.scene;
        let clear_local = |body: Option<&MethodBody>| {
            let local = scene.local(body?.local(name)?)?;
            let ty = local.ty().clone();
            (!ty.is_unclear()).then_some(ty)
        };
        let mut current = scope.method;
        let mut depth = 0;
        while let Some(id) = current {
            let method = scene.method(id)?;
            if let Some(ty) = clear_local(method.body()) {
                return Some(ty);
            }
            depth += 1;
            if depth > limits::MAX_NAME_RESOLUTION_DEPTH {
                break;
            }
            current = method.outer_method;
        }
        scene
            .enclosing_default_methods(scope.class)
            .into_iter()
            .filter(|id| Some(*id) != scope.method)
            .find_map(|id| clear_local(scene.method(id)?.body()))
    }

    /// The type a declaration denotes when used by name.
    pub fn parse_export_to_type(&self, target: &ExportTarget) -> Option<Type> {
        let scene = self.scene;
        match target {
            ExportTarget::Class(id) => scene.class(*id).map(|c| Type::class(c.signature.clone())),
            ExportTarget::Namespace(id) => scene
                .namespace(*id)
                .map(|ns| Type::namespace(ns.signature.clone())),
            ExportTarget::Method(id) => scene.method(*id)?.signature().map(Type::function),
            ExportTarget::Local(id) => {
                let ty = scene.local(*id)?.ty().clone();
                match ty {
                    Type::Unknown | Type::UnclearReference(_) => None,
                    ty => Some(ty),
                }
            }
            ExportTarget::Alias(alias) => Some(Type::Alias(alias.clone())),
            ExportTarget::Module(file) => {
                let signature = scene.file(*file)?.signature.clone();
                Some(Type::namespace(NamespaceSignature::module(signature)))
            }
        }
    }
}

// =============================================================================
// Member lookup
// =============================================================================

impl<'a> InferenceState<'a> {
    /// Resolves `base.name`: the member found (if it is a declaration) and
    /// its type.
    pub fn infer_field_type(&mut self, base: &Type, name: &str, scope: Scope) -> Option<(Option<ClassMember>, Type)> {
        match base.unwrap_alias() {
            Type::Union(union) => {
                if let Some(current) = &union.current {
                    return self.infer_field_type(current, name, scope);
                }
                union
                    .types
                    .iter()
                    .filter(|member| !member.is_nullish())
                    .find_map(|member| self.infer_field_type(member, name, scope))
            }
            Type::Class(class) => self.infer_class_member_type(&class, name, scope),
            Type::Annotation(annotation) => {
                let target = self.namespace_member(&annotation, name)?;
                let ty = self.parse_export_to_type(&target)?;
                Some((Some(ClassMember::Export(target)), ty))
            }
            Type::Array(_) if name == names::ARRAY_LENGTH_NAME => Some((None, Type::Number)),
            Type::Array(array) => {
                let receiver = self.array_class_type(&array)?;
                self.infer_field_type(&receiver, name, scope)
            }
            Type::Generic(generic) => {
                let constraint = generic.constraint.as_deref()?.clone();
                self.infer_field_type(&constraint, name, scope)
            }
            Type::Unknown
            | Type::UnclearReference(_)
            | Type::Any
            | Type::Null
            | Type::Undefined
            | Type::Alias(_) => None,
            other => {
                self.report(
                    scope,
                    &diagnostic_messages::MEMBER_LOOKUP_ON_NON_CLASS,
                    &[name, &other.to_string()],
                );
                None
            }
        }
    }

    fn infer_class_member_type(&mut self, class: &ClassType, name: &str, scope: Scope) -> Option<(Option<ClassMember>, Type)> {
        let scene = self.scene;
        let signature = &class.signature;
        if signature.file.project_name == builtin::DUMMY_PROJECT_NAME
            && signature.name == builtin::ITERATOR_RESULT
            && name == builtin::ITERATOR_RESULT_VALUE
        {
            let value = class
                .real_generic_types
                .as_ref()
                .and_then(|reals| reals.first().cloned())
                .unwrap_or(Type::Unknown);
            return Some((None, value));
        }

        let class_id = scene.class_id(signature)?;
        let member = self.find_property_in_class(class_id, name, scope)?;
        let ty = match &member {
            ClassMember::Field(id) => scene.field(*id)?.ty(),
            ClassMember::Method(id) => Type::function(scene.method(*id)?.signature()?),
            ClassMember::Export(target) => self.parse_export_to_type(target)?,
        };
        let ty = match &class.real_generic_types {
            Some(reals) => {
                let generics = scene.class(class_id)?.generic_types().clone();
                replace_class_generics(&ty, &generics, reals)
            }
            None => ty,
        };
        Some((Some(member), ty))
    }

    /// A member of a namespace or module used in type position.
    pub(crate) fn namespace_member(&self, annotation: &AnnotationNamespaceType, name: &str) -> Option<ExportTarget> {
        let scene = self.scene;
        if annotation.namespace.is_module() {
            let file = scene.file_id(&annotation.namespace.file)?;
            return scene.find_export_in_file(file, name);
        }
        let ns = scene.namespace_id(&annotation.namespace)?;
        scene.find_export_in_namespace(ns, name)
    }

    /// `Array<T>` from the SDK, instantiated with the element type.
    pub(crate) fn array_class_type(&self, array: &ArrayType) -> Option<Type> {
        let ExportTarget::Class(id) = self.scene.get_sdk_global(builtin::ARRAY)? else {
            return None;
        };
        let element = if array.dimension > 1 {
            Type::array((*array.base).clone(), array.dimension - 1)
        } else {
            (*array.base).clone()
        };
        let signature = self.scene.class(*id)?.signature.clone();
        Some(Type::class_with_generics(signature, vec![element]))
    }

    /// Looks `name` up on a class and its heritage: own members, then (for
    /// a default class) the declarations of its file or namespace, then the
    /// super class and implemented interfaces.
    pub fn find_property_in_class(&mut self, class: ClassId, name: &str, scope: Scope) -> Option<ClassMember> {
        let mut guard = RecursionGuard::with_profile(RecursionProfile::HeritageWalk);
        let found = self.find_property_guarded(class, name, &mut guard);
        if guard.is_exceeded() {
            let subject = self
                .scene
                .class(class)
                .map(|c| format!("{}.{name}", c.name()))
                .unwrap_or_else(|| name.to_string());
            self.report_recursion_limit(scope, &subject);
        }
        found
    }

    fn find_property_guarded(&mut self, class: ClassId, name: &str, guard: &mut RecursionGuard<ClassId>) -> Option<ClassMember> {
        if guard.enter(class).is_denied() {
            return None;
        }
        let found = self.find_property_step(class, name, guard);
        guard.leave(class);
        found
    }

    fn find_property_step(&mut self, class: ClassId, name: &str, guard: &mut RecursionGuard<ClassId>) -> Option<ClassMember> {
        let scene = self.scene;
        let ark_class = scene.class(class)?;
        if let Some(member) = ark_class.own_member(name) {
            return Some(member);
        }
        if ark_class.is_default() {
            let owner = ark_class
                .declaring_namespace
                .map_or(DeclOwner::File(ark_class.declaring_file), DeclOwner::Namespace);
            let target = match owner {
                DeclOwner::File(file) => scene.find_export_in_file(file, name),
                DeclOwner::Namespace(ns) => scene.find_export_in_namespace(ns, name),
            };
            if let Some(target) = target {
                return Some(ClassMember::Export(target));
            }
        }
        let mut heritage: SmallVec<[ClassId; 4]> = SmallVec::new();
        heritage.extend(self.super_class_of(class));
        heritage.extend(self.interfaces_of(class));
        heritage
            .into_iter()
            .find_map(|parent| self.find_property_guarded(parent, name, guard))
    }

    /// The super class of `class`, resolved from its name once and memoized.
    pub fn super_class_of(&mut self, class: ClassId) -> Option<ClassId> {
        let scene = self.scene;
        let ark_class = scene.class(class)?;
        if let Some(cached) = ark_class.cached_super_class() {
            return cached;
        }
        let name = ark_class.super_class_name.as_deref()?;
        if !self.resolving_heritage.insert(class) {
            trace!(class = %ark_class.signature, "heritage cycle");
            return None;
        }
        let resolved = self.resolve_class_name(name, class).filter(|id| *id != class);
        self.resolving_heritage.remove(&class);
        // A miss inside another class's heritage walk may be an artifact of
        // the cycle cut above.
        if resolved.is_some() || self.resolving_heritage.is_empty() {
            ark_class.cache_super_class(resolved);
        }
        resolved
    }

    fn interfaces_of(&mut self, class: ClassId) -> SmallVec<[ClassId; 4]> {
        let scene = self.scene;
        let Some(ark_class) = scene.class(class) else {
            return SmallVec::new();
        };
        if ark_class.implemented_interface_names.is_empty() || !self.resolving_heritage.insert(class) {
            return SmallVec::new();
        }
        let interfaces: SmallVec<[ClassId; 4]> = ark_class
            .implemented_interface_names
            .iter()
            .filter_map(|name| self.resolve_class_name(name, class))
            .filter(|id| *id != class)
            .collect();
        self.resolving_heritage.remove(&class);
        interfaces
    }

    fn resolve_class_name(&mut self, name: &str, from: ClassId) -> Option<ClassId> {
        let ty = self.infer_unclear_ref_name(name, Scope::class(from))?;
        let signature = ty.unwrap_alias().class_signature()?.clone();
        self.scene.class_id(&signature)
    }

    /// The declared class of a (possibly aliased) class type.
    pub(crate) fn class_of_type(&self, ty: &Type) -> Option<ClassId> {
        let unwrapped = ty.unwrap_alias();
        self.scene.class_id(unwrapped.class_signature()?)
    }
}

// =============================================================================
// Name parsing
// =============================================================================

fn primitive_type(name: &str) -> Option<Type> {
    Some(match name {
        "number" => Type::Number,
        "string" => Type::String,
        "boolean" => Type::Boolean,
        "any" => Type::Any,
        "void" => Type::Void,
        "never" => Type::Never,
        "null" => Type::Null,
        "undefined" => Type::Undefined,
        _ => return None,
    })
}

/// Splits `a.b<c.d>.e` into `["a", "b<c.d>", "e"]`.
fn split_qualified_name(name: &str) -> SmallVec<[&str; 4]> {
    let mut segments = SmallVec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, ch) in name.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth -= 1,
            '.' if depth == 0 => {
                segments.push(name[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(name[start..].trim());
    segments
}

/// Splits `Foo<A, B<C>>` into `("Foo", ["A", "B<C>"])`.
fn split_generic_suffix(segment: &str) -> (&str, SmallVec<[&str; 2]>) {
    let mut args = SmallVec::new();
    let Some(open) = segment.find('<') else {
        return (segment, args);
    };
    let Some(inner) = segment[open + 1..].strip_suffix('>') else {
        return (segment, args);
    };
    let mut depth = 0i32;
    let mut start = 0;
    for (i, ch) in inner.char_indices() {
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = inner[start..].trim();
    if !last.is_empty() {
        args.push(last);
    }
    (segment[..open].trim(), args)
}

#[cfg(test)]
#[path = "../tests/type_inference_tests.rs"]
mod tests;
