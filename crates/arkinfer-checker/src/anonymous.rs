//! Structural typing of object literals against SDK-declared classes.
//!
//! An object literal is lowered to an anonymous class. When it is passed
//! where the SDK declares a class type, each of its members takes the
//! signature of the declared member with the same name, recursing into
//! nested literals assigned to fields typed as other SDK classes.

use rustc_hash::FxHashSet;
use tracing::debug;

use arkinfer_common::limits;
use arkinfer_ir::model::{ClassId, ClassMember, FieldId, Ref, StmtKind, Value};
use arkinfer_ir::{ClassSignature, MethodSignature, Type};

use crate::state::{InferenceState, Scope};

impl<'a> InferenceState<'a> {
    /// Types the anonymous class `anonymous` after the SDK class `declared`.
    pub fn infer_arg_type_with_sdk(&mut self, anonymous: &ClassSignature, declared: &ClassSignature, scope: Scope) {
        let scene = self.scene;
        let (Some(anonymous), Some(declared)) = (scene.class_id(anonymous), scene.class_id(declared)) else {
            return;
        };
        let mut visited = FxHashSet::default();
        self.infer_anonymous_class(anonymous, declared, &mut visited, scope, 0);
    }

    /// Copies declared member signatures onto the members of an anonymous
    /// class. `visited` holds the anonymous classes already merged, so
    /// self-referential literals terminate.
    pub fn infer_anonymous_class(
        &mut self,
        anonymous: ClassId,
        declared: ClassId,
        visited: &mut FxHashSet<ClassSignature>,
        scope: Scope,
        depth: u32,
    ) {
        let scene = self.scene;
        let Some(anon_class) = scene.class(anonymous) else {
            return;
        };
        if depth > limits::MAX_ANONYMOUS_MERGE_DEPTH {
            self.report_recursion_limit(scope, anon_class.name());
            return;
        }
        if !visited.insert(anon_class.signature.clone()) {
            return;
        }
        debug!(
            anonymous = %anon_class.signature,
            declared = %scene.class(declared).map(|c| c.signature.to_string()).unwrap_or_default(),
            "object literal typed from declaration"
        );

        for field in anon_class.field_ids() {
            let Some(name) = scene.field(field).map(|f| f.name()) else {
                continue;
            };
            match self.find_property_in_class(declared, &name, scope) {
                Some(ClassMember::Field(declared_field)) => {
                    self.assign_anon_field(field, declared_field, visited, scope, depth);
                }
                Some(ClassMember::Method(declared_method)) => {
                    // `onClick: () => {...}` against a declared method.
                    let Some(signature) = scene.method(declared_method).and_then(|m| m.signature()) else {
                        continue;
                    };
                    if let Some(ark_field) = scene.field(field)
                        && ark_field.ty().is_unclear()
                    {
                        ark_field.set_type(Type::function(signature));
                        self.mark_changed();
                    }
                }
                _ => {}
            }
        }

        for method in anon_class.method_ids() {
            let Some(ark_method) = scene.method(method).filter(|m| m.declaring_class == anonymous) else {
                continue;
            };
            let Some(ClassMember::Method(declared_method)) =
                self.find_property_in_class(declared, &ark_method.name, scope)
            else {
                continue;
            };
            let Some(declared_sig) = scene.method(declared_method).and_then(|m| m.signature()) else {
                continue;
            };
            if let Some(implementation) = ark_method.implementation_signature()
                && let Some(merged) = with_declared_types(&implementation, &declared_sig)
            {
                ark_method.set_implementation_signature(merged);
                self.mark_changed();
            }
        }
    }

    fn assign_anon_field(
        &mut self,
        field: FieldId,
        declared_field: FieldId,
        visited: &mut FxHashSet<ClassSignature>,
        scope: Scope,
        depth: u32,
    ) {
        let scene = self.scene;
        let (Some(anon_field), Some(declared)) = (scene.field(field), scene.field(declared_field)) else {
            return;
        };
        let declared_sig = declared.signature().clone();

        let assigned = anon_field
            .initializer()
            .iter()
            .rev()
            .find_map(|stmt| match &stmt.kind {
                StmtKind::Assign { right, .. } => Some(right.ty(scene)),
                _ => None,
            });
        if let Some(assigned) = assigned
            && let Some(nested) = class_in(&assigned, true)
            && let Some(nested_declared) = class_in(&declared_sig.ty, false)
            && scene.is_sdk_project(&nested_declared.file.project_name)
            && let (Some(nested), Some(nested_declared)) =
                (scene.class_id(&nested), scene.class_id(&nested_declared))
        {
            self.infer_anonymous_class(nested, nested_declared, visited, scope, depth + 1);
        }

        if *anon_field.signature() != declared_sig {
            anon_field.set_signature(declared_sig.clone());
            self.mark_changed();
        }
        for index in 0..anon_field.initializer_len() {
            let Some(mut stmt) = anon_field.initializer_stmt(index) else {
                continue;
            };
            let StmtKind::Assign { left: Value::Ref(reference), .. } = &mut stmt.kind else {
                continue;
            };
            let (Ref::InstanceField { field, .. } | Ref::StaticField { field }) = reference.as_mut() else {
                continue;
            };
            if field.name == declared_sig.name && *field != declared_sig {
                *field = declared_sig.clone();
                anon_field.replace_initializer_stmt(index, stmt);
            }
        }
    }
}

/// The class of `ty`, looking through one level of array or union.
/// `anonymous` selects object-literal classes or declared ones.
fn class_in(ty: &Type, anonymous: bool) -> Option<ClassSignature> {
    let wanted = |t: &Type| match t.unwrap_alias() {
        Type::Class(class) if class.signature.is_anonymous() == anonymous => Some(class.signature),
        _ => None,
    };
    match ty.unwrap_alias() {
        Type::Array(array) => wanted(&array.base),
        Type::Union(union) => union.types.iter().find_map(wanted),
        other => wanted(&other),
    }
}

/// `signature` with unclear parameter and return types taken from `declared`.
fn with_declared_types(signature: &MethodSignature, declared: &MethodSignature) -> Option<MethodSignature> {
    let mut merged = signature.clone();
    let mut changed = false;
    let params = merged.sub.parameters.iter_mut().filter(|p| !p.is_lexical_env());
    for (param, declared) in params.zip(declared.sub.call_parameters()) {
        if param.ty.is_unclear() && !declared.ty.is_unclear() {
            param.ty = declared.ty.clone();
            changed = true;
        }
    }
    if merged.sub.return_type.is_unclear() && !declared.sub.return_type.is_unclear() {
        merged.sub.return_type = declared.sub.return_type.clone();
        changed = true;
    }
    changed.then_some(merged)
}
