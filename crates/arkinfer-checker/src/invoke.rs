//! Call target resolution.
//!
//! An invocation whose signature still names the placeholder class is bound
//! to a concrete method signature:
//!
//! - `recv.m()`: by the type of `recv` (aliases and unions unwrapped,
//!   `null`/`undefined` members skipped; arrays use the SDK `Array` class)
//! - `m()`: static method of the current class, top-level function in
//!   scope, function-valued local, then imports and SDK globals
//! - `f()` through a local: the local's function type or the call
//!   signature of its callback class
//!
//! The chosen method picks its overload with `match_method_signature`, and
//! class generics of the receiver are substituted into the result.

use tracing::{debug, trace};

use arkinfer_common::diagnostics::diagnostic_messages;
use arkinfer_common::names::{self, builtin};
use arkinfer_common::limits;
use arkinfer_ir::model::{
    ArkClass, ClassMember, ExportTarget, InvokeExpr, InvokeKind, LocalId, MethodId, Value,
};
use arkinfer_ir::{
    ClassSignature, ClassType, MethodParameter, MethodSignature, MethodSubSignature,
    NamespaceSignature, Type, replace_signature_generics,
};

use crate::state::{InferenceState, Scope};

impl<'a> InferenceState<'a> {
    /// Infers the arguments of `invoke`, binds its target, then types the
    /// arguments against the chosen parameters.
    pub fn infer_invoke(&mut self, invoke: &mut InvokeExpr, scope: Scope) {
        for arg in &mut invoke.args {
            self.infer_value(arg, scope);
        }
        let needs_binding =
            is_unresolved(invoke) || invoke.method_signature.return_type().is_unclear();
        if needs_binding {
            let bound = self.resolve_invoke(invoke, scope);
            if !bound && is_unresolved(invoke) {
                if self.should_report_unresolved(invoke) {
                    let target = call_target_text(invoke);
                    self.report(scope, &diagnostic_messages::UNRESOLVED_INVOKE, &[&target]);
                }
                return;
            }
        }
        self.infer_args(invoke, scope);
    }

    fn resolve_invoke(&mut self, invoke: &mut InvokeExpr, scope: Scope) -> bool {
        match invoke.kind.clone() {
            InvokeKind::Instance { base } => self.infer_instance_invoke_expr(invoke, base, scope),
            InvokeKind::Static => self.infer_static_invoke_expr(invoke, scope),
            InvokeKind::Ptr { callee } => self.infer_ptr_invoke_expr(invoke, callee, scope),
        }
    }

    /// Calls on an unknown or `any` receiver are expected to stay unbound.
    fn should_report_unresolved(&self, invoke: &InvokeExpr) -> bool {
        let receiver = match invoke.kind {
            InvokeKind::Instance { base } => base,
            InvokeKind::Ptr { callee } => callee,
            InvokeKind::Static => return true,
        };
        self.scene
            .local(receiver)
            .is_some_and(|l| !l.ty().is_unclear() && !matches!(*l.ty(), Type::Any))
    }

    fn infer_instance_invoke_expr(&mut self, invoke: &mut InvokeExpr, base: LocalId, scope: Scope) -> bool {
        self.infer_local(base, scope);
        let Some(receiver) = self.scene.local(base).map(|l| l.ty().clone()) else {
            return false;
        };
        self.resolve_invoke_on_type(invoke, &receiver, scope, 0)
    }

    fn infer_ptr_invoke_expr(&mut self, invoke: &mut InvokeExpr, callee: LocalId, scope: Scope) -> bool {
        self.infer_local(callee, scope);
        let Some(ty) = self.scene.local(callee).map(|l| l.ty().clone()) else {
            return false;
        };
        self.bind_callable_type(invoke, &ty, scope)
    }

    fn infer_static_invoke_expr(&mut self, invoke: &mut InvokeExpr, scope: Scope) -> bool {
        let scene = self.scene;
        let name = invoke.method_name().to_string();
        let declaring = invoke.method_signature.declaring_class.clone();

        // `Name.m()` with `Name` still unbound.
        if declaring.name != names::UNKNOWN_CLASS_NAME && declaring.file.is_unknown() {
            return match self.infer_unclear_ref_name(&declaring.name, scope) {
                Some(receiver) => self.resolve_invoke_on_type(invoke, &receiver, scope, 0),
                None => false,
            };
        }
        if !declaring.file.is_unknown() {
            // Bound earlier; refresh through the declaring class.
            let receiver = Type::class(declaring);
            return self.resolve_invoke_on_type(invoke, &receiver, scope, 0);
        }
        match name.as_str() {
            names::IMPORT_CALL_NAME => return self.infer_import_call(invoke, scope),
            names::SUPER_NAME => return self.infer_super_call(invoke, scope),
            _ => {}
        }

        if let Some(method) = scene.class(scope.class).and_then(|c| c.static_method(&name)) {
            return self.bind_method(invoke, method, None);
        }
        if let Some(method) = scene.find_function_in_scope(&name, scope.class) {
            return self.bind_method(invoke, method, None);
        }
        let own_local = scope
            .method
            .and_then(|m| scene.method(m)?.body()?.local(&name));
        if let Some(local) = own_local
            && self.bind_callee_local(invoke, local, scope)
        {
            return true;
        }
        if let Some(local) = self.find_declared_local(&name, scope)
            && self.bind_callee_local(invoke, local, scope)
        {
            return true;
        }

        let file = scene.class(scope.class).map(|c| c.declaring_file);
        if let Some(import) = file.and_then(|f| scene.find_import(f, &name)) {
            return match scene.resolve_import(import) {
                Some(target) => self.bind_export_target(invoke, &target, scope),
                None => false,
            };
        }
        match scene.get_sdk_global(&name) {
            Some(target) => {
                let target = target.clone();
                self.bind_export_target(invoke, &target, scope)
            }
            None => false,
        }
    }

    fn bind_export_target(&mut self, invoke: &mut InvokeExpr, target: &ExportTarget, scope: Scope) -> bool {
        match target {
            ExportTarget::Method(method) => self.bind_method(invoke, *method, None),
            ExportTarget::Local(local) => self.bind_callee_local(invoke, *local, scope),
            _ => false,
        }
    }

    /// Binds a call through a function-valued local and turns the call into
    /// a pointer invocation.
    fn bind_callee_local(&mut self, invoke: &mut InvokeExpr, local: LocalId, scope: Scope) -> bool {
        self.infer_local(local, scope);
        let Some(ty) = self.scene.local(local).map(|l| l.ty().clone()) else {
            return false;
        };
        if !self.bind_callable_type(invoke, &ty, scope) {
            return false;
        }
        invoke.kind = InvokeKind::Ptr { callee: local };
        true
    }

    /// `import("./m")`: the module's namespace type, as a promise when the
    /// SDK declares one.
    fn infer_import_call(&mut self, invoke: &mut InvokeExpr, scope: Scope) -> bool {
        let scene = self.scene;
        let Some(Value::Constant(specifier)) = invoke.args.first() else {
            return false;
        };
        let specifier = specifier.value.trim_matches(|c| c == '"' || c == '\'');
        let Some(importing) = scene.class(scope.class).map(|c| c.declaring_file) else {
            return false;
        };
        let Some(module) = scene.resolve_module(specifier, importing) else {
            return false;
        };
        let (Some(module_file), Some(importing_file)) = (scene.file(module), scene.file(importing)) else {
            return false;
        };
        let Some(owner) = scene.class(importing_file.default_class) else {
            return false;
        };
        let module_ty = Type::namespace(NamespaceSignature::module(module_file.signature.clone()));
        let return_type = self.wrap_in_promise(module_ty);
        invoke.method_signature = MethodSignature::new(
            owner.signature.clone(),
            MethodSubSignature::new(
                names::IMPORT_CALL_NAME,
                vec![MethodParameter::new("specifier", Type::String)],
                return_type,
            ),
        );
        true
    }

    /// `super(...)`: the super class constructor, declared or implicit.
    fn infer_super_call(&mut self, invoke: &mut InvokeExpr, scope: Scope) -> bool {
        let scene = self.scene;
        let Some(super_class) = self.super_class_of(scope.class) else {
            return false;
        };
        let Some(ark_super) = scene.class(super_class) else {
            return false;
        };
        match ark_super.method(names::CONSTRUCTOR_NAME) {
            Some(constructor) => self.bind_method(invoke, constructor, None),
            None => {
                invoke.method_signature = implicit_constructor(ark_super);
                true
            }
        }
    }
}

// =============================================================================
// Receiver types
// =============================================================================

impl<'a> InferenceState<'a> {
    /// Binds `invoke` to the member of `receiver` it names.
    pub(crate) fn resolve_invoke_on_type(&mut self, invoke: &mut InvokeExpr, receiver: &Type, scope: Scope, depth: u32) -> bool {
        if depth > limits::MAX_ALIAS_CHAIN_DEPTH {
            self.report_recursion_limit(scope, &receiver.to_string());
            return false;
        }
        match receiver {
            Type::Alias(alias) => {
                let original = alias.original_type().clone();
                self.resolve_invoke_on_type(invoke, &original, scope, depth + 1)
            }
            Type::Union(union) => {
                let candidates: Vec<Type> = union
                    .current
                    .iter()
                    .map(|c| (**c).clone())
                    .chain(union.types.iter().filter(|t| !t.is_nullish()).cloned())
                    .collect();
                candidates
                    .iter()
                    .any(|member| self.resolve_invoke_on_type(invoke, member, scope, depth + 1))
            }
            Type::Array(array) => match self.array_class_type(array) {
                Some(class_ty) => self.resolve_invoke_on_type(invoke, &class_ty, scope, depth + 1),
                None => false,
            },
            Type::Generic(generic) => match generic.constraint.as_deref() {
                Some(constraint) => {
                    let constraint = constraint.clone();
                    self.resolve_invoke_on_type(invoke, &constraint, scope, depth + 1)
                }
                None => false,
            },
            Type::Annotation(annotation) => {
                let name = invoke.method_name().to_string();
                let Some(target) = self.namespace_member(annotation, &name) else {
                    return false;
                };
                let bound = self.bind_export_target(invoke, &target, scope);
                if bound && matches!(invoke.kind, InvokeKind::Instance { .. }) {
                    invoke.kind = InvokeKind::Static;
                }
                bound
            }
            Type::Class(class) => self.resolve_invoke_on_class(invoke, class, scope),
            _ => false,
        }
    }

    fn resolve_invoke_on_class(&mut self, invoke: &mut InvokeExpr, class: &ClassType, scope: Scope) -> bool {
        let scene = self.scene;
        let name = invoke.method_name().to_string();
        let signature = &class.signature;

        if signature.file.project_name == builtin::DUMMY_PROJECT_NAME
            && signature.name == builtin::ITERATOR
            && name == builtin::ITERATOR_NEXT
        {
            let element = class
                .real_generic_types
                .as_ref()
                .and_then(|reals| reals.first().cloned())
                .unwrap_or(Type::Unknown);
            let result = ClassSignature::new(builtin::ITERATOR_RESULT, signature.file.clone(), None);
            invoke.method_signature = MethodSignature::new(
                signature.clone(),
                MethodSubSignature::new(name, Vec::new(), Type::class_with_generics(result, vec![element])),
            );
            return true;
        }

        let Some(class_id) = scene.class_id(signature) else {
            return false;
        };
        let receiver = Type::Class(class.clone());
        match self.find_property_in_class(class_id, &name, scope) {
            Some(ClassMember::Method(method)) => return self.bind_method(invoke, method, Some(&receiver)),
            Some(ClassMember::Field(_)) => {
                if let Some((_, field_ty)) = self.infer_field_type(&receiver, &name, scope)
                    && self.bind_callable_type(invoke, &field_ty, scope)
                {
                    return true;
                }
            }
            Some(ClassMember::Export(target)) => {
                if self.bind_export_target(invoke, &target, scope) {
                    return true;
                }
            }
            None => {}
        }
        if name == names::CONSTRUCTOR_NAME
            && let Some(ark_class) = scene.class(class_id)
        {
            invoke.method_signature = implicit_constructor(ark_class);
            return true;
        }
        false
    }

    /// Binds a call through a value of type `ty`: a function type, or a
    /// callback class with a call signature.
    fn bind_callable_type(&mut self, invoke: &mut InvokeExpr, ty: &Type, scope: Scope) -> bool {
        match ty.unwrap_alias() {
            Type::Function(func) => {
                if invoke.real_generic_types.is_none() {
                    invoke.real_generic_types = func.real_generic_types.clone();
                }
                invoke.method_signature = *func.signature;
                true
            }
            Type::Class(class) => {
                let Some(id) = self.scene.class_id(&class.signature) else {
                    return false;
                };
                match self.find_property_in_class(id, names::CALL_SIGNATURE_NAME, scope) {
                    Some(ClassMember::Method(create)) => {
                        let receiver = Type::Class(class);
                        self.bind_method(invoke, create, Some(&receiver))
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Binds `invoke` to the overload of `method` matching its arguments.
    pub(crate) fn bind_method(&mut self, invoke: &mut InvokeExpr, method: MethodId, receiver: Option<&Type>) -> bool {
        let scene = self.scene;
        let Some(ark_method) = scene.method(method) else {
            return false;
        };
        let arg_types: Vec<Type> = invoke.args.iter().map(|a| a.ty(scene)).collect();
        let Some(mut signature) = ark_method.match_method_signature(&arg_types) else {
            return false;
        };

        if let Some(Type::Class(class)) = receiver.map(Type::unwrap_alias)
            && let Some(reals) = &class.real_generic_types
            && scene.class_id(&class.signature) == Some(ark_method.declaring_class)
            && let Some(ark_class) = scene.class(ark_method.declaring_class)
        {
            let generics = ark_class.generic_types().clone();
            signature = replace_signature_generics(&signature, &generics, reals);
        }

        if ark_method.is_static() && matches!(invoke.kind, InvokeKind::Instance { .. }) {
            invoke.kind = InvokeKind::Static;
        }
        if signature != invoke.method_signature {
            debug!(call = %invoke.method_name(), target = %signature, "call target bound");
        } else {
            trace!(call = %invoke.method_name(), "call target unchanged");
        }
        invoke.method_signature = signature;
        true
    }
}

fn is_unresolved(invoke: &InvokeExpr) -> bool {
    invoke.method_signature.declaring_class.file.is_unknown()
}

fn call_target_text(invoke: &InvokeExpr) -> String {
    let declaring = &invoke.method_signature.declaring_class.name;
    if declaring == names::UNKNOWN_CLASS_NAME {
        invoke.method_name().to_string()
    } else {
        format!("{declaring}.{}", invoke.method_name())
    }
}

fn implicit_constructor(class: &ArkClass) -> MethodSignature {
    MethodSignature::new(
        class.signature.clone(),
        MethodSubSignature::new(names::CONSTRUCTOR_NAME, Vec::new(), class.class_type()),
    )
}

#[cfg(test)]
#[path = "../tests/invoke_tests.rs"]
mod tests;
