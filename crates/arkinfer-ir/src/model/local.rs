use std::cell::{Cell, Ref, RefCell};

use arkinfer_common::names;

use super::{LocalId, MethodId, StmtId};
use crate::types::Type;

/// A method-scoped variable, including parameters, `this` and temporaries.
#[derive(Debug)]
pub struct Local {
    pub id: LocalId,
    pub name: String,
    pub declaring_method: MethodId,
    ty: RefCell<Type>,
    declaring_stmt: Cell<Option<StmtId>>,
    is_parameter: Cell<bool>,
}

impl Local {
    pub(crate) fn new(id: LocalId, name: String, declaring_method: MethodId, ty: Type) -> Self {
        Self {
            id,
            name,
            declaring_method,
            ty: RefCell::new(ty),
            declaring_stmt: Cell::new(None),
            is_parameter: Cell::new(false),
        }
    }

    pub fn ty(&self) -> Ref<'_, Type> {
        self.ty.borrow()
    }

    pub fn set_type(&self, ty: Type) {
        *self.ty.borrow_mut() = ty;
    }

    /// The statement that declares this local, when the IR builder recorded it.
    pub fn declaring_stmt(&self) -> Option<StmtId> {
        self.declaring_stmt.get()
    }

    pub fn set_declaring_stmt(&self, stmt: StmtId) {
        self.declaring_stmt.set(Some(stmt));
    }

    pub fn is_parameter(&self) -> bool {
        self.is_parameter.get()
    }

    pub(crate) fn mark_parameter(&self) {
        self.is_parameter.set(true);
    }

    pub fn is_this(&self) -> bool {
        self.name == names::THIS_NAME
    }

    pub fn is_temp(&self) -> bool {
        names::is_temp_local_name(&self.name)
    }
}
