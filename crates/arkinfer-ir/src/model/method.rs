use std::cell::{Ref, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use arkinfer_common::names;

use super::{ClassId, LocalId, MethodId, Modifiers, Stmt, StmtKind, Value};
use crate::signature::{MethodParameter, MethodSignature, MethodSubSignature};
use crate::types::{AliasType, GenericType, Type};

// =============================================================================
// Builder input
// =============================================================================

/// Builder input for [`Scene::add_method`](super::Scene::add_method).
#[derive(Clone, Debug)]
pub struct MethodDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub generic_types: Vec<GenericType>,
    /// Overload declarations (`foo(a: number): void;`).
    pub declare_signatures: Vec<MethodSubSignature>,
    /// The signature of the body, if the method has one.
    pub implementation: Option<MethodSubSignature>,
    /// Enclosing method of a closure.
    pub outer_method: Option<MethodId>,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: Modifiers::empty(),
            generic_types: Vec::new(),
            declare_signatures: Vec::new(),
            implementation: None,
            outer_method: None,
        }
    }

    /// Adds an overload declaration without a body.
    pub fn declare(mut self, parameters: Vec<MethodParameter>, return_type: Type) -> Self {
        let sub = MethodSubSignature::new(self.name.clone(), parameters, return_type);
        self.declare_signatures.push(sub);
        self
    }

    /// Gives the method a body with the given signature.
    pub fn implement(mut self, parameters: Vec<MethodParameter>, return_type: Type) -> Self {
        self.implementation = Some(MethodSubSignature::new(self.name.clone(), parameters, return_type));
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_generics(mut self, generics: Vec<GenericType>) -> Self {
        self.generic_types = generics;
        self
    }

    pub fn nested_in(mut self, outer: MethodId) -> Self {
        self.outer_method = Some(outer);
        self
    }
}

// =============================================================================
// Body
// =============================================================================

#[derive(Debug, Default)]
pub struct BasicBlock {
    pub(crate) stmts: RefCell<Vec<Stmt>>,
    pub successors: Vec<usize>,
}

impl BasicBlock {
    pub fn len(&self) -> usize {
        self.stmts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.borrow().is_empty()
    }

    /// Clone of the statement at `index`. Inference works on the clone and
    /// writes it back with [`replace_stmt`](Self::replace_stmt), so no borrow
    /// of the block is held while other methods are inferred.
    pub fn stmt(&self, index: usize) -> Option<Stmt> {
        self.stmts.borrow().get(index).cloned()
    }

    pub fn replace_stmt(&self, index: usize, stmt: Stmt) {
        if let Some(slot) = self.stmts.borrow_mut().get_mut(index) {
            *slot = stmt;
        }
    }

    pub fn stmts(&self) -> Ref<'_, Vec<Stmt>> {
        self.stmts.borrow()
    }
}

#[derive(Debug, Default)]
pub struct Cfg {
    pub blocks: Vec<BasicBlock>,
}

impl Cfg {
    /// Every statement in block order.
    pub fn stmts(&self) -> Vec<Stmt> {
        self.blocks
            .iter()
            .flat_map(|b| b.stmts.borrow().clone())
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct MethodBody {
    pub(crate) locals: IndexMap<String, LocalId>,
    pub(crate) alias_types: IndexMap<String, Rc<AliasType>>,
    pub cfg: Cfg,
}

impl MethodBody {
    pub fn local(&self, name: &str) -> Option<LocalId> {
        self.locals.get(name).copied()
    }

    pub fn local_ids(&self) -> impl Iterator<Item = LocalId> + '_ {
        self.locals.values().copied()
    }

    pub fn alias_type(&self, name: &str) -> Option<&Rc<AliasType>> {
        self.alias_types.get(name)
    }

    pub fn alias_types(&self) -> impl Iterator<Item = &Rc<AliasType>> {
        self.alias_types.values()
    }
}

// =============================================================================
// ArkMethod
// =============================================================================

#[derive(Debug)]
pub struct ArkMethod {
    pub id: MethodId,
    pub name: String,
    pub declaring_class: ClassId,
    pub modifiers: Modifiers,
    pub outer_method: Option<MethodId>,
    generic_types: RefCell<Vec<GenericType>>,
    declare_signatures: RefCell<Vec<MethodSignature>>,
    implementation_signature: RefCell<Option<MethodSignature>>,
    pub(crate) body: Option<MethodBody>,
}

impl ArkMethod {
    pub(crate) fn new(
        id: MethodId,
        declaring_class: ClassId,
        decl: &MethodDecl,
        declare_signatures: Vec<MethodSignature>,
        implementation_signature: Option<MethodSignature>,
    ) -> Self {
        Self {
            id,
            name: decl.name.clone(),
            declaring_class,
            modifiers: decl.modifiers,
            outer_method: decl.outer_method,
            generic_types: RefCell::new(decl.generic_types.clone()),
            declare_signatures: RefCell::new(declare_signatures),
            implementation_signature: RefCell::new(implementation_signature),
            body: None,
        }
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    pub fn is_async(&self) -> bool {
        self.modifiers.contains(Modifiers::ASYNC)
    }

    pub fn is_constructor(&self) -> bool {
        self.name == names::CONSTRUCTOR_NAME
    }

    pub fn is_default(&self) -> bool {
        self.name == names::DEFAULT_ARK_METHOD_NAME
    }

    pub fn is_anonymous(&self) -> bool {
        names::is_anonymous_method_name(&self.name)
    }

    pub fn body(&self) -> Option<&MethodBody> {
        self.body.as_ref()
    }

    pub fn generic_types(&self) -> Ref<'_, Vec<GenericType>> {
        self.generic_types.borrow()
    }

    pub fn set_generic_types(&self, generics: Vec<GenericType>) {
        *self.generic_types.borrow_mut() = generics;
    }

    pub fn declare_signatures(&self) -> Vec<MethodSignature> {
        self.declare_signatures.borrow().clone()
    }

    pub fn implementation_signature(&self) -> Option<MethodSignature> {
        self.implementation_signature.borrow().clone()
    }

    pub fn set_implementation_signature(&self, signature: MethodSignature) {
        *self.implementation_signature.borrow_mut() = Some(signature);
    }

    pub fn set_declare_signature(&self, index: usize, signature: MethodSignature) {
        if let Some(slot) = self.declare_signatures.borrow_mut().get_mut(index) {
            *slot = signature;
        }
    }

    /// Appends overload declarations merged in from another declaration of
    /// the same name.
    pub fn extend_declare_signatures(&self, signatures: impl IntoIterator<Item = MethodSignature>) {
        self.declare_signatures.borrow_mut().extend(signatures);
    }

    /// Declared overloads followed by the implementation signature.
    pub fn signatures(&self) -> Vec<MethodSignature> {
        let mut all = self.declare_signatures();
        all.extend(self.implementation_signature());
        all
    }

    /// The implementation signature, else the first declaration.
    pub fn signature(&self) -> Option<MethodSignature> {
        self.implementation_signature()
            .or_else(|| self.declare_signatures.borrow().first().cloned())
    }

    /// Every value returned by a `return` statement of the body.
    pub fn return_values(&self) -> Vec<Value> {
        let Some(body) = &self.body else {
            return Vec::new();
        };
        body.cfg
            .blocks
            .iter()
            .flat_map(|block| {
                block
                    .stmts
                    .borrow()
                    .iter()
                    .filter_map(|stmt| match &stmt.kind {
                        StmtKind::Return(value) => Some(value.clone()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    // =========================================================================
    // Overload matching
    // =========================================================================

    /// Picks the signature a call with `arg_types` binds to.
    ///
    /// Among declared overloads that accept the argument count, the first (in
    /// declaration order) whose parameters all shape-match the arguments
    /// wins; else the first one accepting the count; else the implementation
    /// signature; else the first declaration.
    pub fn match_method_signature(&self, arg_types: &[Type]) -> Option<MethodSignature> {
        let declared = self.declare_signatures.borrow();
        let by_arity: SmallVec<[&MethodSignature; 4]> = declared
            .iter()
            .filter(|sig| sig.sub.accepts_arity(arg_types.len()))
            .collect();

        if let Some(found) = by_arity
            .iter()
            .find(|sig| parameters_match(&sig.sub, arg_types))
        {
            return Some((*found).clone());
        }
        if let Some(first) = by_arity.first() {
            return Some((*first).clone());
        }
        self.implementation_signature()
            .or_else(|| declared.first().cloned())
    }
}

fn parameters_match(sub: &MethodSubSignature, arg_types: &[Type]) -> bool {
    let params: SmallVec<[&MethodParameter; 8]> = sub.call_parameters().collect();
    arg_types.iter().enumerate().all(|(i, arg)| {
        let param = match params.get(i) {
            Some(p) => *p,
            None => match params.last() {
                Some(last) if last.rest => *last,
                _ => return false,
            },
        };
        let expected = match (&param.ty, param.rest) {
            (Type::Array(array), true) => array.base.as_ref(),
            (ty, _) => ty,
        };
        type_shape_matches(expected, arg, 0)
    })
}

/// Loose structural compatibility used only to rank overloads.
fn type_shape_matches(param: &Type, arg: &Type, depth: u32) -> bool {
    if depth > arkinfer_common::limits::MAX_ALIAS_CHAIN_DEPTH {
        return true;
    }
    match (param, arg) {
        (Type::Union(union), _) => union
            .types
            .iter()
            .any(|member| type_shape_matches(member, arg, depth + 1)),
        (Type::Alias(alias), _) => type_shape_matches(&alias.original_type(), arg, depth + 1),
        (_, Type::Alias(alias)) => type_shape_matches(param, &alias.original_type(), depth + 1),
        (Type::Any | Type::Unknown | Type::Generic(_), _) => true,
        (_, Type::Unknown | Type::Null | Type::Undefined | Type::Any | Type::UnclearReference(_)) => true,
        (Type::Function(expected), Type::Function(actual)) => {
            actual.signature.sub.call_parameters().count()
                <= expected.signature.sub.call_parameters().count()
        }
        (Type::Class(expected), Type::Class(actual)) => {
            actual.signature.is_anonymous()
                || expected.signature.name == actual.signature.name
        }
        (Type::Array(expected), Type::Array(actual)) => {
            type_shape_matches(&expected.base, &actual.base, depth + 1)
        }
        (_, Type::Union(union)) => union
            .types
            .iter()
            .any(|member| type_shape_matches(param, member, depth + 1)),
        _ => param.is_same_variant(arg),
    }
}

#[cfg(test)]
#[path = "../../tests/overload_tests.rs"]
mod tests;
