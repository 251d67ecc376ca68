use std::cell::{OnceCell, Ref, RefCell};

use indexmap::IndexMap;

use super::{ClassId, ExportTarget, FieldId, FileId, MethodId, Modifiers, NamespaceId};
use crate::signature::ClassSignature;
use crate::types::{GenericType, Type};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassCategory {
    Class,
    Struct,
    Interface,
    Enum,
    TypeLiteral,
    Object,
}

/// Where a declaration lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclOwner {
    File(FileId),
    Namespace(NamespaceId),
}

/// Result of a member lookup on a class.
#[derive(Clone, Debug, PartialEq)]
pub enum ClassMember {
    Field(FieldId),
    Method(MethodId),
    /// A module-level declaration reached through a default class.
    Export(ExportTarget),
}

/// Builder input for [`Scene::add_class`](super::Scene::add_class).
#[derive(Clone, Debug)]
pub struct ClassDecl {
    pub name: String,
    pub category: ClassCategory,
    pub modifiers: Modifiers,
    pub super_class_name: Option<String>,
    pub implemented_interface_names: Vec<String>,
    pub generic_types: Vec<GenericType>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: ClassCategory::Class,
            modifiers: Modifiers::empty(),
            super_class_name: None,
            implemented_interface_names: Vec::new(),
            generic_types: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name).with_category(ClassCategory::Interface)
    }

    pub fn with_category(mut self, category: ClassCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn extends(mut self, name: impl Into<String>) -> Self {
        self.super_class_name = Some(name.into());
        self
    }

    pub fn implements(mut self, name: impl Into<String>) -> Self {
        self.implemented_interface_names.push(name.into());
        self
    }

    pub fn with_generics(mut self, generics: Vec<GenericType>) -> Self {
        self.generic_types = generics;
        self
    }
}

#[derive(Debug)]
pub struct ArkClass {
    pub id: ClassId,
    pub signature: ClassSignature,
    pub category: ClassCategory,
    pub modifiers: Modifiers,
    pub declaring_file: FileId,
    pub declaring_namespace: Option<NamespaceId>,
    pub super_class_name: Option<String>,
    pub implemented_interface_names: Vec<String>,
    generic_types: RefCell<Vec<GenericType>>,
    /// Unset: not computed. `Some(None)`: computed, no resolvable super class.
    super_class: OnceCell<Option<ClassId>>,
    pub(crate) fields: IndexMap<String, FieldId>,
    pub(crate) static_fields: IndexMap<String, FieldId>,
    pub(crate) methods: IndexMap<String, MethodId>,
    pub(crate) static_methods: IndexMap<String, MethodId>,
    pub(crate) default_method: Option<MethodId>,
}

impl ArkClass {
    pub(crate) fn new(
        id: ClassId,
        signature: ClassSignature,
        decl: ClassDecl,
        declaring_file: FileId,
        declaring_namespace: Option<NamespaceId>,
    ) -> Self {
        Self {
            id,
            signature,
            category: decl.category,
            modifiers: decl.modifiers,
            declaring_file,
            declaring_namespace,
            super_class_name: decl.super_class_name,
            implemented_interface_names: decl.implemented_interface_names,
            generic_types: RefCell::new(decl.generic_types),
            super_class: OnceCell::new(),
            fields: IndexMap::new(),
            static_fields: IndexMap::new(),
            methods: IndexMap::new(),
            static_methods: IndexMap::new(),
            default_method: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn is_default(&self) -> bool {
        self.signature.is_default()
    }

    pub fn is_anonymous(&self) -> bool {
        self.signature.is_anonymous()
    }

    pub fn generic_types(&self) -> Ref<'_, Vec<GenericType>> {
        self.generic_types.borrow()
    }

    pub fn set_generic_types(&self, generics: Vec<GenericType>) {
        *self.generic_types.borrow_mut() = generics;
    }

    /// `ClassType` of this class, carrying its own generics as arguments.
    pub fn class_type(&self) -> Type {
        let generics = self.generic_types.borrow();
        Type::class_with_generics(
            self.signature.clone(),
            generics.iter().cloned().map(Type::Generic).collect(),
        )
    }

    /// The memoized super class link, if already computed.
    pub fn cached_super_class(&self) -> Option<Option<ClassId>> {
        self.super_class.get().copied()
    }

    /// Records the resolved super class. The first recorded value wins.
    pub fn cache_super_class(&self, super_class: Option<ClassId>) {
        let _ = self.super_class.set(super_class);
    }

    pub fn field(&self, name: &str) -> Option<FieldId> {
        self.fields.get(name).copied()
    }

    pub fn static_field(&self, name: &str) -> Option<FieldId> {
        self.static_fields.get(name).copied()
    }

    pub fn method(&self, name: &str) -> Option<MethodId> {
        self.methods.get(name).copied()
    }

    pub fn static_method(&self, name: &str) -> Option<MethodId> {
        self.static_methods.get(name).copied()
    }

    /// Instance then static field named `name`.
    pub fn any_field(&self, name: &str) -> Option<FieldId> {
        self.field(name).or_else(|| self.static_field(name))
    }

    /// Instance then static method named `name`.
    pub fn any_method(&self, name: &str) -> Option<MethodId> {
        self.method(name).or_else(|| self.static_method(name))
    }

    /// Own member lookup: field first, then method.
    pub fn own_member(&self, name: &str) -> Option<ClassMember> {
        self.any_field(name)
            .map(ClassMember::Field)
            .or_else(|| self.any_method(name).map(ClassMember::Method))
    }

    /// Instance and static fields in declaration order.
    pub fn field_ids(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.fields.values().chain(self.static_fields.values()).copied()
    }

    /// Instance and static methods in declaration order.
    pub fn method_ids(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.methods.values().chain(self.static_methods.values()).copied()
    }

    /// The `%dflt` method of a default class.
    pub fn default_method(&self) -> Option<MethodId> {
        self.default_method
    }
}
