use std::cell::OnceCell;
use std::rc::Rc;

use super::{ClassId, ExportId, FileId, ImportId, LocalId, MethodId, NamespaceId};
use crate::types::AliasType;

/// A declaration reachable through an import or export.
#[derive(Clone, Debug, PartialEq)]
pub enum ExportTarget {
    Class(ClassId),
    Namespace(NamespaceId),
    Method(MethodId),
    Local(LocalId),
    Alias(Rc<AliasType>),
    /// A whole module (`import * as m`, `export * as m`).
    Module(FileId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// `import { a as b } from "m"`
    Named,
    /// `import a from "m"`
    Default,
    /// `import * as m from "m"`
    Namespace,
}

/// Builder input for [`Scene::add_import`](super::Scene::add_import).
#[derive(Clone, Debug)]
pub struct ImportDecl {
    pub clause_name: String,
    pub kind: ImportKind,
    pub from: String,
    pub name_before_as: Option<String>,
}

impl ImportDecl {
    pub fn named(clause_name: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            clause_name: clause_name.into(),
            kind: ImportKind::Named,
            from: from.into(),
            name_before_as: None,
        }
    }

    pub fn default_import(clause_name: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            kind: ImportKind::Default,
            ..Self::named(clause_name, from)
        }
    }

    pub fn namespace(clause_name: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            kind: ImportKind::Namespace,
            ..Self::named(clause_name, from)
        }
    }

    /// `import { original as clause }`
    pub fn renamed(mut self, original: impl Into<String>) -> Self {
        self.name_before_as = Some(original.into());
        self
    }
}

#[derive(Debug)]
pub struct ImportInfo {
    pub id: ImportId,
    pub clause_name: String,
    pub kind: ImportKind,
    pub from: String,
    pub name_before_as: Option<String>,
    pub declaring_file: FileId,
    pub(crate) lazy_export: OnceCell<ExportTarget>,
}

impl ImportInfo {
    /// Name looked up in the target module.
    pub fn imported_name(&self) -> &str {
        match self.kind {
            ImportKind::Default => arkinfer_common::names::DEFAULT_EXPORT_NAME,
            _ => self.name_before_as.as_deref().unwrap_or(&self.clause_name),
        }
    }
}

/// Builder input for [`Scene::add_export`](super::Scene::add_export).
#[derive(Clone, Debug)]
pub struct ExportDecl {
    pub clause_name: String,
    pub name_before_as: Option<String>,
    /// Module specifier of a re-export (`export { a } from "./m"`).
    pub from: Option<String>,
}

impl ExportDecl {
    pub fn new(clause_name: impl Into<String>) -> Self {
        Self {
            clause_name: clause_name.into(),
            name_before_as: None,
            from: None,
        }
    }

    /// `export { original as clause }`
    pub fn renamed(mut self, original: impl Into<String>) -> Self {
        self.name_before_as = Some(original.into());
        self
    }

    pub fn from_module(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }
}

#[derive(Debug)]
pub struct ExportInfo {
    pub id: ExportId,
    pub clause_name: String,
    pub name_before_as: Option<String>,
    pub from: Option<String>,
    pub declaring_file: FileId,
    pub declaring_namespace: Option<NamespaceId>,
    pub(crate) target: OnceCell<ExportTarget>,
}

impl ExportInfo {
    /// Name of the exported declaration in its own scope.
    pub fn local_name(&self) -> &str {
        self.name_before_as.as_deref().unwrap_or(&self.clause_name)
    }
}
