//! Program model: the whole-program [`Scene`] and the entities it owns.
//!
//! Entities live in arenas inside the `Scene` and refer to each other by id.
//! The scene is built through `&mut Scene` builder methods; afterwards the
//! inference passes only need `&Scene` and write inferred data through the
//! interior-mutability cells on the entities (signatures, local types,
//! statement blocks, memoized links).

use bitflags::bitflags;

mod class;
mod field;
mod file;
mod import;
mod local;
mod method;
mod resolve;
mod scene;
mod stmt;

pub use class::{ArkClass, ClassCategory, ClassDecl, ClassMember, DeclOwner};
pub use field::{ArkField, FieldCategory, FieldDecl};
pub use file::{ArkFile, ArkNamespace};
pub use import::{ExportDecl, ExportInfo, ExportTarget, ImportDecl, ImportInfo, ImportKind};
pub use local::Local;
pub use method::{ArkMethod, BasicBlock, Cfg, MethodBody, MethodDecl};
pub use scene::Scene;
pub use stmt::{
    AliasOriginal, AliasTypeExpr, BinaryOperator, Constant, Expr, InvokeExpr, InvokeKind, Ref, Stmt,
    StmtKind, UnaryOperator, Value,
};

// =============================================================================
// Ids
// =============================================================================

macro_rules! define_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub u32);

            impl $name {
                #[inline]
                pub fn index(self) -> usize {
                    self.0 as usize
                }
            }
        )*
    };
}

define_id!(
    FileId,
    NamespaceId,
    ClassId,
    MethodId,
    FieldId,
    LocalId,
    ImportId,
    ExportId,
    /// Unique across the scene; assigned by [`Scene::push_stmt`].
    StmtId,
);

// =============================================================================
// Modifiers
// =============================================================================

bitflags! {
    /// Declaration modifiers of classes, methods and fields.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u32 {
        const PRIVATE   = 1 << 0;
        const PROTECTED = 1 << 1;
        const PUBLIC    = 1 << 2;
        const EXPORT    = 1 << 3;
        const STATIC    = 1 << 4;
        const ABSTRACT  = 1 << 5;
        const ASYNC     = 1 << 6;
        const CONST     = 1 << 7;
        const ACCESSOR  = 1 << 8;
        const DEFAULT   = 1 << 9;
        const READONLY  = 1 << 10;
        const OVERRIDE  = 1 << 11;
        const DECLARE   = 1 << 12;
    }
}
