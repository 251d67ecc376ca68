use std::cell::{Ref, RefCell};

use super::{ClassId, FieldId, Modifiers, Stmt};
use crate::signature::FieldSignature;
use crate::types::Type;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldCategory {
    Property,
    EnumMember,
    Accessor,
}

/// Builder input for [`Scene::add_field`](super::Scene::add_field).
#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub name: String,
    pub ty: Type,
    pub modifiers: Modifiers,
    pub category: FieldCategory,
    pub optional: bool,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            modifiers: Modifiers::empty(),
            category: FieldCategory::Property,
            optional: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn enum_member(mut self) -> Self {
        self.category = FieldCategory::EnumMember;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

#[derive(Debug)]
pub struct ArkField {
    pub id: FieldId,
    pub declaring_class: ClassId,
    pub category: FieldCategory,
    pub modifiers: Modifiers,
    pub optional: bool,
    signature: RefCell<FieldSignature>,
    initializer: RefCell<Vec<Stmt>>,
}

impl ArkField {
    pub(crate) fn new(
        id: FieldId,
        declaring_class: ClassId,
        decl: &FieldDecl,
        signature: FieldSignature,
    ) -> Self {
        Self {
            id,
            declaring_class,
            category: decl.category,
            modifiers: decl.modifiers,
            optional: decl.optional,
            signature: RefCell::new(signature),
            initializer: RefCell::new(Vec::new()),
        }
    }

    pub fn name(&self) -> String {
        self.signature.borrow().name.clone()
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    pub fn signature(&self) -> Ref<'_, FieldSignature> {
        self.signature.borrow()
    }

    pub fn set_signature(&self, signature: FieldSignature) {
        *self.signature.borrow_mut() = signature;
    }

    pub fn ty(&self) -> Type {
        self.signature.borrow().ty.clone()
    }

    pub fn set_type(&self, ty: Type) {
        self.signature.borrow_mut().ty = ty;
    }

    /// Snapshot of the initializer statements.
    pub fn initializer(&self) -> Vec<Stmt> {
        self.initializer.borrow().clone()
    }

    pub fn initializer_len(&self) -> usize {
        self.initializer.borrow().len()
    }

    pub fn initializer_stmt(&self, index: usize) -> Option<Stmt> {
        self.initializer.borrow().get(index).cloned()
    }

    pub fn replace_initializer_stmt(&self, index: usize, stmt: Stmt) {
        if let Some(slot) = self.initializer.borrow_mut().get_mut(index) {
            *slot = stmt;
        }
    }

    pub(crate) fn push_initializer(&self, stmt: Stmt) {
        self.initializer.borrow_mut().push(stmt);
    }
}
