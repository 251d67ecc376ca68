use indexmap::IndexMap;

use super::{ClassId, ExportId, FileId, ImportId, NamespaceId};
use crate::signature::{FileSignature, NamespaceSignature};

#[derive(Debug)]
pub struct ArkFile {
    pub id: FileId,
    pub signature: FileSignature,
    /// Set for files of a separately loaded declaration project.
    pub is_sdk: bool,
    pub default_class: ClassId,
    pub(crate) classes: IndexMap<String, ClassId>,
    pub(crate) namespaces: IndexMap<String, NamespaceId>,
    pub(crate) imports: Vec<ImportId>,
    pub(crate) exports: IndexMap<String, ExportId>,
}

impl ArkFile {
    pub fn name(&self) -> &str {
        &self.signature.file_name
    }

    pub fn project_name(&self) -> &str {
        &self.signature.project_name
    }

    pub fn class(&self, name: &str) -> Option<ClassId> {
        self.classes.get(name).copied()
    }

    pub fn namespace(&self, name: &str) -> Option<NamespaceId> {
        self.namespaces.get(name).copied()
    }

    /// Top-level classes, default class first.
    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.classes.values().copied()
    }

    pub fn namespace_ids(&self) -> impl Iterator<Item = NamespaceId> + '_ {
        self.namespaces.values().copied()
    }

    pub fn import_ids(&self) -> &[ImportId] {
        &self.imports
    }

    pub fn export(&self, name: &str) -> Option<ExportId> {
        self.exports.get(name).copied()
    }

    pub fn export_ids(&self) -> impl Iterator<Item = ExportId> + '_ {
        self.exports.values().copied()
    }
}

#[derive(Debug)]
pub struct ArkNamespace {
    pub id: NamespaceId,
    pub signature: NamespaceSignature,
    pub declaring_file: FileId,
    pub parent: Option<NamespaceId>,
    pub default_class: ClassId,
    pub(crate) classes: IndexMap<String, ClassId>,
    pub(crate) namespaces: IndexMap<String, NamespaceId>,
    pub(crate) exports: IndexMap<String, ExportId>,
}

impl ArkNamespace {
    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn class(&self, name: &str) -> Option<ClassId> {
        self.classes.get(name).copied()
    }

    pub fn namespace(&self, name: &str) -> Option<NamespaceId> {
        self.namespaces.get(name).copied()
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.classes.values().copied()
    }

    pub fn namespace_ids(&self) -> impl Iterator<Item = NamespaceId> + '_ {
        self.namespaces.values().copied()
    }

    pub fn export(&self, name: &str) -> Option<ExportId> {
        self.exports.get(name).copied()
    }
}
