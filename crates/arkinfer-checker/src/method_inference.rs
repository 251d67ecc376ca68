//! Propagation of types through files, classes, methods and statements.
//!
//! Statements are cloned out of their basic block, inferred, and written
//! back only when something changed, so no block borrow is held while a
//! nested lookup reads other methods.

use std::rc::Rc;

use indexmap::IndexSet;
use tracing::{Level, debug, span, trace};

use arkinfer_common::diagnostics::diagnostic_messages;
use arkinfer_common::names::{self, builtin};
use arkinfer_ir::model::{
    AliasOriginal, AliasTypeExpr, ClassId, Expr, ExportTarget, FieldId, FileId, LocalId, MethodId,
    NamespaceId, Ref, Stmt, StmtKind, Value,
};
use arkinfer_ir::{AliasType, MethodSignature, Type};

use crate::state::{InferenceState, Scope};

// =============================================================================
// Files, namespaces and classes
// =============================================================================

impl<'a> InferenceState<'a> {
    /// Infers every class of `file`, including the classes of nested
    /// namespaces.
    pub fn infer_file(&mut self, file: FileId) {
        let scene = self.scene;
        let Some(ark_file) = scene.file(file) else {
            return;
        };
        let _span = span!(Level::DEBUG, "infer_file", file = %ark_file.signature).entered();
        for class in ark_file.class_ids() {
            self.infer_class(class);
        }
        for ns in ark_file.namespace_ids() {
            self.infer_namespace(ns);
        }
    }

    fn infer_namespace(&mut self, ns: NamespaceId) {
        let scene = self.scene;
        let Some(namespace) = scene.namespace(ns) else {
            return;
        };
        for class in namespace.class_ids() {
            self.infer_class(class);
        }
        for nested in namespace.namespace_ids() {
            self.infer_namespace(nested);
        }
    }

    /// Class generics, then fields, then methods.
    pub fn infer_class(&mut self, class: ClassId) {
        let scene = self.scene;
        let Some(ark_class) = scene.class(class) else {
            return;
        };
        let generics = ark_class.generic_types().clone();
        if let Some(generics) = self.infer_generic_types(&generics, Scope::class(class)) {
            ark_class.set_generic_types(generics);
            self.mark_changed();
        }
        for field in ark_class.field_ids() {
            self.infer_type_in_ark_field(field);
        }
        for method in ark_class.method_ids() {
            // Methods attached from another class are inferred there.
            if scene.method(method).is_some_and(|m| m.declaring_class == class) {
                self.infer_type_in_method(method);
            }
        }
    }
}

// =============================================================================
// Methods
// =============================================================================

impl<'a> InferenceState<'a> {
    /// Resolves the signatures of `method`, then every statement of its body,
    /// then its return type.
    pub fn infer_type_in_method(&mut self, method: MethodId) {
        let scene = self.scene;
        let Some(ark_method) = scene.method(method) else {
            return;
        };
        let Some(scope) = Scope::method(scene, method) else {
            return;
        };
        let _span = span!(Level::DEBUG, "infer_type_in_method", method = %ark_method.name).entered();

        let generics = ark_method.generic_types().clone();
        if let Some(generics) = self.infer_generic_types(&generics, scope) {
            ark_method.set_generic_types(generics);
            self.mark_changed();
        }

        for (index, signature) in ark_method.declare_signatures().iter().enumerate() {
            if let Some(inferred) = self.infer_method_signature(signature, scope) {
                ark_method.set_declare_signature(index, inferred);
                self.mark_changed();
            }
        }
        if let Some(signature) = ark_method.implementation_signature()
            && let Some(inferred) = self.infer_method_signature(&signature, scope)
        {
            ark_method.set_implementation_signature(inferred);
            self.mark_changed();
        }

        self.infer_body(method, scope);
        self.infer_return_types(method);
    }

    /// Parameter and return types resolved by name. `None` if nothing
    /// improved.
    fn infer_method_signature(&mut self, signature: &MethodSignature, scope: Scope) -> Option<MethodSignature> {
        let mut result = signature.clone();
        let mut improved = false;
        for param in &mut result.sub.parameters {
            if param.is_lexical_env() || !param.ty.is_unclear() {
                continue;
            }
            if let Some(ty) = self.infer_uncleared_type(&param.ty, scope, None)
                && ty != param.ty
            {
                param.ty = ty;
                improved = true;
            }
        }
        let return_type = &result.sub.return_type;
        if return_type.is_unclear()
            && let Some(ty) = self.infer_uncleared_type(return_type, scope, None)
            && ty != *return_type
        {
            result.sub.return_type = ty;
            improved = true;
        }
        improved.then_some(result)
    }

    fn infer_body(&mut self, method: MethodId, scope: Scope) {
        let Some(body) = self.scene.method(method).and_then(|m| m.body()) else {
            return;
        };
        // Declared locals no statement mentions still need their types.
        for local in body.local_ids() {
            self.infer_local(local, scope);
        }
        for block in &body.cfg.blocks {
            for index in 0..block.len() {
                let Some(mut stmt) = block.stmt(index) else {
                    continue;
                };
                let before = stmt.clone();
                self.current_position = stmt.position;
                self.infer_stmt(&mut stmt, scope);
                if stmt != before {
                    trace!(stmt = stmt.id.0, "statement updated");
                    block.replace_stmt(index, stmt);
                    self.mark_changed();
                }
            }
        }
        self.current_position = None;
    }
}

// =============================================================================
// Statements and values
// =============================================================================

impl<'a> InferenceState<'a> {
    pub(crate) fn infer_stmt(&mut self, stmt: &mut Stmt, scope: Scope) {
        let scene = self.scene;
        if stmt.locals().iter().any(|id| scene.local(*id).is_none()) {
            let method_name = scope
                .method
                .and_then(|m| scene.method(m))
                .map(|m| m.name.clone())
                .unwrap_or_default();
            self.report(
                scope,
                &diagnostic_messages::STATEMENT_INFERENCE_FAILED,
                &[&stmt_text(stmt), &method_name],
            );
            return;
        }

        let original_text = stmt.original_text.clone();
        match &mut stmt.kind {
            StmtKind::AliasTypeDefine { alias, expr } => {
                let alias = Rc::clone(alias);
                let expr = expr.clone();
                self.infer_alias_type_expr(&alias, &expr, scope);
            }
            StmtKind::Assign { left, right } => {
                self.infer_value(right, scope);
                self.infer_value(left, scope);
                let right = right.clone();
                self.resolve_assign_stmt(left, &right, original_text.as_deref(), scope);
            }
            StmtKind::Invoke(invoke) => self.infer_invoke(invoke, scope),
            StmtKind::If(value) | StmtKind::Return(value) | StmtKind::Throw(value) => {
                self.infer_value(value, scope)
            }
            StmtKind::ReturnVoid | StmtKind::Nop => {}
        }
    }

    pub(crate) fn infer_value(&mut self, value: &mut Value, scope: Scope) {
        match value {
            Value::Local(id) => self.infer_local(*id, scope),
            Value::Constant(_) => {}
            Value::Expr(expr) => self.infer_expr(expr, scope),
            Value::Ref(reference) => {
                if let Some(replaced) = self.infer_ref(reference, scope) {
                    **reference = replaced;
                }
            }
        }
    }

    fn infer_expr(&mut self, expr: &mut Expr, scope: Scope) {
        match expr {
            Expr::Invoke(invoke) => self.infer_invoke(invoke, scope),
            Expr::New { class_type } => self.infer_type_slot(class_type, scope),
            Expr::NewArray { base_type, size } => {
                self.infer_type_slot(base_type, scope);
                self.infer_value(size, scope);
            }
            Expr::Binop { left, right, .. } => {
                self.infer_value(left, scope);
                self.infer_value(right, scope);
            }
            Expr::Cast { operand, ty } => {
                self.infer_value(operand, scope);
                self.infer_type_slot(ty, scope);
            }
            Expr::InstanceOf { operand, check_type } => {
                self.infer_value(operand, scope);
                self.infer_type_slot(check_type, scope);
            }
            Expr::Unop { operand, .. }
            | Expr::TypeOf(operand)
            | Expr::Await(operand)
            | Expr::Delete(operand) => self.infer_value(operand, scope),
        }
    }

    /// Resolves a type embedded in an expression in place.
    fn infer_type_slot(&mut self, ty: &mut Type, scope: Scope) {
        if !ty.is_unclear() {
            return;
        }
        if let Some(resolved) = self.infer_uncleared_type(ty, scope, None) {
            *ty = resolved;
        }
    }

    /// Returns a replacement for `reference` when its shape or type changed.
    fn infer_ref(&mut self, reference: &Ref, scope: Scope) -> Option<Ref> {
        match reference {
            Ref::InstanceField { base, field } => {
                self.infer_local(*base, scope);
                self.infer_field_ref(*base, field, scope)
            }
            Ref::StaticField { field } => self.infer_static_field_ref(field, scope),
            Ref::Array { base, index } => {
                self.infer_local(*base, scope);
                let mut index = index.clone();
                self.infer_value(&mut index, scope);
                Some(Ref::Array { base: *base, index })
            }
            Ref::Parameter { index, ty } => {
                let method = self.scene.method(scope.method?)?;
                let signature = method.implementation_signature()?;
                let declared = &signature.sub.parameters.get(*index)?.ty;
                if declared == ty || (declared.is_unclear() && !ty.is_unclear()) {
                    return None;
                }
                Some(Ref::Parameter {
                    index: *index,
                    ty: declared.clone(),
                })
            }
            Ref::This { ty } => {
                let class_type = self.scene.class(scope.class)?.class_type();
                (class_type != *ty).then_some(Ref::This { ty: class_type })
            }
        }
    }

    /// Resolves the type of a local by its declared type, then by the
    /// declaration of the same name in an enclosing method, then by name.
    pub(crate) fn infer_local(&mut self, id: LocalId, scope: Scope) {
        let scene = self.scene;
        let Some(local) = scene.local(id) else {
            return;
        };
        let ty = local.ty().clone();
        if !ty.is_unclear() {
            return;
        }
        if let Some(resolved) = self.infer_uncleared_type(&ty, scope, None) {
            self.update_local_type(id, resolved);
            return;
        }
        if local.is_this() || local.is_temp() || local.is_parameter() {
            return;
        }
        if let Some(outer) = self.find_declared_local(&local.name, scope) {
            let outer_ty = scene.local(outer).map(|l| l.ty().clone());
            if let Some(outer_ty) = outer_ty.filter(|t| !t.is_unclear()) {
                self.update_local_type(id, outer_ty);
                return;
            }
        }
        if matches!(ty, Type::Unknown)
            && let Some(resolved) = self.infer_base_type(&local.name, scope)
        {
            self.update_local_type(id, resolved);
        }
    }

    /// The local named `name` declared in a method enclosing the scope
    /// method, or at the top level of an enclosing namespace or file.
    pub(crate) fn find_declared_local(&self, name: &str, scope: Scope) -> Option<LocalId> {
        if name == names::THIS_NAME || names::is_temp_local_name(name) {
            return None;
        }
        let scene = self.scene;
        let declared_in = |method: MethodId| {
            let id = scene.method(method)?.body()?.local(name)?;
            let local = scene.local(id)?;
            (!local.is_parameter()).then_some(id)
        };
        let mut current = scope.method.and_then(|m| scene.method(m)?.outer_method);
        let mut depth = 0;
        while let Some(method) = current {
            if let Some(found) = declared_in(method) {
                return Some(found);
            }
            depth += 1;
            if depth > arkinfer_common::limits::MAX_NAME_RESOLUTION_DEPTH {
                break;
            }
            current = scene.method(method)?.outer_method;
        }
        scene
            .enclosing_default_methods(scope.class)
            .into_iter()
            .filter(|m| Some(*m) != scope.method)
            .find_map(declared_in)
    }

    fn resolve_assign_stmt(&mut self, left: &mut Value, right: &Value, original_text: Option<&str>, scope: Scope) {
        let scene = self.scene;
        let right_ty = right.ty(scene);
        let right_clear = !right_ty.is_unclear();
        match left {
            Value::Local(id) => {
                let id = *id;
                let Some(local) = scene.local(id) else {
                    return;
                };
                let left_ty = local.ty().clone();
                if left_ty.is_unclear() {
                    let hint = right_clear.then_some(&right_ty);
                    match self.infer_uncleared_type(&left_ty, scope, hint) {
                        Some(inferred) => {
                            self.update_local_type(id, inferred);
                        }
                        None if right_clear => {
                            self.update_local_type(id, right_ty.clone());
                        }
                        None => {}
                    }
                } else if let Type::Union(union) = &left_ty
                    && right_clear
                {
                    let mut narrowed = union.clone();
                    narrowed.current = union
                        .types
                        .iter()
                        .find(|m| **m == right_ty || m.class_signature().is_some_and(|s| Some(s) == right_ty.class_signature()))
                        .cloned()
                        .map(Box::new);
                    if narrowed.current.is_some() {
                        self.update_local_type(id, Type::Union(narrowed));
                    }
                }
                if right_clear && self.assigns_captured_local(id, original_text) {
                    self.backfill_declared_local(id, &right_ty, scope);
                }
            }
            Value::Ref(reference) => {
                let (Ref::InstanceField { field, .. } | Ref::StaticField { field }) = reference.as_mut() else {
                    return;
                };
                if !right_clear || !field.ty.is_unclear() {
                    return;
                }
                field.ty = right_ty.clone();
                if let Some(ark_field) = scene.get_field(field)
                    && ark_field.ty().is_unclear()
                {
                    ark_field.set_type(right_ty);
                    self.mark_changed();
                }
            }
            Value::Constant(_) | Value::Expr(_) => {}
        }
    }

    /// Whether an assignment to `id` writes a variable declared outside the
    /// current method. Locals declared by a statement of their own method
    /// never are; without that record the statement text must start with the
    /// local's name.
    fn assigns_captured_local(&self, id: LocalId, original_text: Option<&str>) -> bool {
        let Some(local) = self.scene.local(id) else {
            return false;
        };
        if local.declaring_stmt().is_some() || local.is_this() || local.is_temp() {
            return false;
        }
        if !self.options.declaration_text_heuristic {
            return true;
        }
        original_text.is_some_and(|text| text.trim_start().starts_with(local.name.as_str()))
    }

    fn backfill_declared_local(&mut self, id: LocalId, ty: &Type, scope: Scope) {
        let Some(name) = self.scene.local(id).map(|l| l.name.clone()) else {
            return;
        };
        let Some(declared) = self.find_declared_local(&name, scope) else {
            return;
        };
        let unclear = self.scene.local(declared).is_some_and(|l| l.ty().is_unclear());
        if unclear && self.update_local_type(declared, ty.clone()) {
            debug!(local = %name, ty = %ty, "declaration site back-filled");
        }
    }
}

fn stmt_text(stmt: &Stmt) -> String {
    if let Some(text) = &stmt.original_text {
        return text.clone();
    }
    match &stmt.kind {
        StmtKind::Assign { left, right } => format!("{left} = {right}"),
        StmtKind::Invoke(invoke) => format!("invoke {}", invoke.method_signature),
        StmtKind::If(value) => format!("if {value}"),
        StmtKind::Return(value) => format!("return {value}"),
        StmtKind::ReturnVoid => "return".to_string(),
        StmtKind::Throw(value) => format!("throw {value}"),
        StmtKind::AliasTypeDefine { alias, .. } => format!("type {}", alias.name),
        StmtKind::Nop => "nop".to_string(),
    }
}

// =============================================================================
// Return types, fields and aliases
// =============================================================================

impl<'a> InferenceState<'a> {
    /// Constructors return their class type. Other methods whose declared
    /// return type is still unclear take the distinct resolved types of
    /// their `return` values, as a union when there is more than one.
    pub fn infer_return_types(&mut self, method: MethodId) {
        let scene = self.scene;
        let Some(ark_method) = scene.method(method) else {
            return;
        };
        let Some(class) = scene.class(ark_method.declaring_class) else {
            return;
        };

        if ark_method.is_constructor() {
            let class_type = class.class_type();
            for (index, mut signature) in ark_method.declare_signatures().into_iter().enumerate() {
                if signature.sub.return_type != class_type {
                    signature.sub.return_type = class_type.clone();
                    ark_method.set_declare_signature(index, signature);
                    self.mark_changed();
                }
            }
            if let Some(mut signature) = ark_method.implementation_signature()
                && signature.sub.return_type != class_type
            {
                signature.sub.return_type = class_type;
                ark_method.set_implementation_signature(signature);
                self.mark_changed();
            }
            return;
        }

        if !self.options.infer_return_types_from_body {
            return;
        }
        let Some(mut signature) = ark_method.implementation_signature() else {
            return;
        };
        if !signature.sub.return_type.is_unclear() {
            return;
        }
        let mut types: IndexSet<Type> = IndexSet::new();
        for value in ark_method.return_values() {
            for ty in value.ty(scene).flat_types() {
                if !ty.is_unclear() {
                    types.insert(ty);
                }
            }
        }
        let inferred = match types.len() {
            0 => return,
            1 => types.into_iter().next().unwrap_or(Type::Unknown),
            _ => Type::union(types),
        };
        let inferred = if ark_method.is_async() {
            self.wrap_in_promise(inferred)
        } else {
            inferred
        };
        if inferred.is_unclear() {
            return;
        }
        debug!(method = %ark_method.name, ty = %inferred, "return type inferred from body");
        signature.sub.return_type = inferred;
        ark_method.set_implementation_signature(signature);
        self.mark_changed();
    }

    /// `Promise<ty>` with the SDK's global `Promise`, or `ty` unchanged when
    /// there is none or `ty` already is a promise.
    pub(crate) fn wrap_in_promise(&self, ty: Type) -> Type {
        if ty.unwrap_alias().promise_argument().is_some() {
            return ty;
        }
        let Some(ExportTarget::Class(promise)) = self.scene.get_sdk_global(builtin::PROMISE) else {
            return ty;
        };
        match self.scene.class(*promise) {
            Some(class) => Type::class_with_generics(class.signature.clone(), vec![ty]),
            None => ty,
        }
    }

    /// Runs the initializer of `field`; a field whose type is still unclear
    /// afterwards takes the type of the last assigned value.
    pub fn infer_type_in_ark_field(&mut self, field: FieldId) {
        let scene = self.scene;
        let Some(ark_field) = scene.field(field) else {
            return;
        };
        let Some(class) = scene.class(ark_field.declaring_class) else {
            return;
        };
        let init_name = if ark_field.is_static() {
            names::STATIC_INIT_METHOD_NAME
        } else {
            names::INSTANCE_INIT_METHOD_NAME
        };
        let scope = Scope {
            class: class.id,
            method: class
                .any_method(init_name)
                .or_else(|| class.method(names::CONSTRUCTOR_NAME)),
        };

        let mut last_assigned: Option<Type> = None;
        for index in 0..ark_field.initializer_len() {
            let Some(mut stmt) = ark_field.initializer_stmt(index) else {
                continue;
            };
            let before = stmt.clone();
            self.current_position = stmt.position;
            self.infer_stmt(&mut stmt, scope);
            if let StmtKind::Assign { right, .. } = &stmt.kind {
                last_assigned = Some(right.ty(scene));
            }
            if stmt != before {
                ark_field.replace_initializer_stmt(index, stmt);
                self.mark_changed();
            }
        }
        self.current_position = None;

        let ty = ark_field.ty();
        if !ty.is_unclear() {
            return;
        }
        let hint = last_assigned.filter(|t| !t.is_unclear());
        let resolved = self
            .infer_uncleared_type(&ty, scope, hint.as_ref())
            .or(hint);
        if let Some(resolved) = resolved.filter(|t| *t != ty) {
            trace!(field = %ark_field.name(), ty = %resolved, "field type inferred");
            ark_field.set_type(resolved);
            self.mark_changed();
        }
    }

    /// Resolves the original type of `type A = ...` from its declaration.
    pub fn infer_alias_type_expr(&mut self, alias: &Rc<AliasType>, expr: &AliasTypeExpr, scope: Scope) {
        if !alias.original_type().is_unclear() {
            return;
        }
        let resolved = match &expr.original {
            AliasOriginal::Type(_) => {
                self.infer_uncleared_type(&Type::Alias(Rc::clone(alias)), scope, None);
                return;
            }
            AliasOriginal::Local(local) => {
                self.infer_local(*local, scope);
                self.scene.local(*local).map(|l| l.ty().clone())
            }
            AliasOriginal::Import(import) => self
                .scene
                .resolve_import(*import)
                .and_then(|target| self.parse_export_to_type(&target)),
        };
        if let Some(ty) = resolved.filter(|t| !t.is_unclear()) {
            trace!(alias = %alias.name, ty = %ty, "alias original resolved");
            alias.set_original_type(ty);
            self.mark_changed();
        }
    }
}

#[cfg(test)]
#[path = "../tests/method_inference_tests.rs"]
mod tests;
