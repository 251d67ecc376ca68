//! Whole-program index and its builder.

use std::cell::OnceCell;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;

use arkinfer_common::names;

use super::{
    ArkClass, ArkField, ArkFile, ArkMethod, ArkNamespace, BasicBlock, ClassDecl, ClassId, DeclOwner,
    ExportDecl, ExportId, ExportInfo, ExportTarget, FieldDecl, FieldId, FileId, ImportDecl, ImportId,
    ImportInfo, Local, LocalId, MethodBody, MethodDecl, MethodId, Modifiers, NamespaceId, Ref, Stmt,
    StmtId, StmtKind, Value,
};
use crate::signature::{
    AliasTypeSignature, BaseSignature, ClassSignature, FieldSignature, FileSignature,
    MethodSignature, MethodSubSignature, NamespaceSignature,
};
use crate::types::{AliasType, GenericType, Type};

/// The whole-program index.
///
/// Built through the `add_*` / `push_*` methods (single writer), then shared
/// as `&Scene` by every inference pass.
#[derive(Debug, Default)]
pub struct Scene {
    files: Vec<ArkFile>,
    namespaces: Vec<ArkNamespace>,
    classes: Vec<ArkClass>,
    methods: Vec<ArkMethod>,
    fields: Vec<ArkField>,
    locals: Vec<Local>,
    imports: Vec<ImportInfo>,
    exports: Vec<ExportInfo>,
    file_index: FxHashMap<FileSignature, FileId>,
    class_index: FxHashMap<ClassSignature, ClassId>,
    namespace_index: FxHashMap<NamespaceSignature, NamespaceId>,
    /// SDK project name -> files, in load order.
    sdk_projects: IndexMap<String, Vec<FileId>>,
    /// Global names declared by SDK files, filled by the declaration merge.
    sdk_globals: IndexMap<String, ExportTarget>,
    next_stmt: u32,
}

// =============================================================================
// Accessors
// =============================================================================

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self, id: FileId) -> Option<&ArkFile> {
        self.files.get(id.index())
    }

    pub fn namespace(&self, id: NamespaceId) -> Option<&ArkNamespace> {
        self.namespaces.get(id.index())
    }

    pub fn class(&self, id: ClassId) -> Option<&ArkClass> {
        self.classes.get(id.index())
    }

    pub fn method(&self, id: MethodId) -> Option<&ArkMethod> {
        self.methods.get(id.index())
    }

    pub fn field(&self, id: FieldId) -> Option<&ArkField> {
        self.fields.get(id.index())
    }

    pub fn local(&self, id: LocalId) -> Option<&Local> {
        self.locals.get(id.index())
    }

    pub fn import(&self, id: ImportId) -> Option<&ImportInfo> {
        self.imports.get(id.index())
    }

    pub fn export(&self, id: ExportId) -> Option<&ExportInfo> {
        self.exports.get(id.index())
    }

    pub fn file_ids(&self) -> impl Iterator<Item = FileId> + '_ {
        (0..self.files.len()).map(|i| FileId(i as u32))
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn get_file(&self, signature: &FileSignature) -> Option<&ArkFile> {
        self.file_index.get(signature).and_then(|id| self.file(*id))
    }

    pub fn get_class(&self, signature: &ClassSignature) -> Option<&ArkClass> {
        self.class_index.get(signature).and_then(|id| self.class(*id))
    }

    pub fn get_namespace(&self, signature: &NamespaceSignature) -> Option<&ArkNamespace> {
        self.namespace_index
            .get(signature)
            .and_then(|id| self.namespace(*id))
    }

    /// The method a signature names, looked up on its declaring class.
    pub fn get_method(&self, signature: &MethodSignature) -> Option<&ArkMethod> {
        let class = self.get_class(&signature.declaring_class)?;
        let id = if signature.sub.is_static {
            class.static_method(signature.name()).or_else(|| class.method(signature.name()))
        } else {
            class.any_method(signature.name())
        }?;
        self.method(id)
    }

    pub fn get_field(&self, signature: &FieldSignature) -> Option<&ArkField> {
        let BaseSignature::Class(class_sig) = &signature.declaring else {
            return None;
        };
        let class = self.get_class(class_sig)?;
        self.field(class.any_field(&signature.name)?)
    }

    pub fn get_sdk_global(&self, name: &str) -> Option<&ExportTarget> {
        self.sdk_globals.get(name)
    }

    pub fn sdk_globals(&self) -> impl Iterator<Item = (&str, &ExportTarget)> {
        self.sdk_globals.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// SDK project name -> files of that project.
    pub fn project_sdk_map(&self) -> &IndexMap<String, Vec<FileId>> {
        &self.sdk_projects
    }

    pub fn is_sdk_project(&self, project_name: &str) -> bool {
        self.sdk_projects.contains_key(project_name)
    }

    pub fn file_of_class(&self, class: ClassId) -> Option<&ArkFile> {
        self.file(self.class(class)?.declaring_file)
    }

    pub fn class_of_method(&self, method: MethodId) -> Option<&ArkClass> {
        self.class(self.method(method)?.declaring_class)
    }

    /// The `%dflt` class of a file or namespace.
    pub fn default_class_of(&self, owner: DeclOwner) -> Option<ClassId> {
        match owner {
            DeclOwner::File(file) => self.file(file).map(|f| f.default_class),
            DeclOwner::Namespace(ns) => self.namespace(ns).map(|n| n.default_class),
        }
    }

    pub fn class_id(&self, signature: &ClassSignature) -> Option<ClassId> {
        self.class_index.get(signature).copied()
    }

    pub fn namespace_id(&self, signature: &NamespaceSignature) -> Option<NamespaceId> {
        self.namespace_index.get(signature).copied()
    }

    pub fn file_id(&self, signature: &FileSignature) -> Option<FileId> {
        self.file_index.get(signature).copied()
    }

    /// Name of a local for diagnostics; `%l<N>` when unknown.
    pub fn local_name(&self, id: LocalId) -> String {
        self.local(id)
            .map(|l| l.name.clone())
            .unwrap_or_else(|| format!("%l{}", id.0))
    }
}

// =============================================================================
// Builder
// =============================================================================

impl Scene {
    /// Adds a source file with its default class and default method.
    pub fn add_file(&mut self, project: impl Into<String>, file_name: impl Into<String>) -> FileId {
        self.add_file_inner(FileSignature::new(project, file_name), false)
    }

    /// Adds a file of a separately loaded declaration (SDK) project.
    pub fn add_sdk_file(&mut self, project: impl Into<String>, file_name: impl Into<String>) -> FileId {
        let signature = FileSignature::new(project, file_name);
        let project_name = signature.project_name.clone();
        let id = self.add_file_inner(signature, true);
        self.sdk_projects.entry(project_name).or_default().push(id);
        id
    }

    fn add_file_inner(&mut self, signature: FileSignature, is_sdk: bool) -> FileId {
        let id = FileId(self.files.len() as u32);
        let default_class = ClassId(self.classes.len() as u32);
        let mut classes = IndexMap::new();
        classes.insert(names::DEFAULT_ARK_CLASS_NAME.to_string(), default_class);
        self.files.push(ArkFile {
            id,
            signature: signature.clone(),
            is_sdk,
            default_class,
            classes,
            namespaces: IndexMap::new(),
            imports: Vec::new(),
            exports: IndexMap::new(),
        });
        self.file_index.insert(signature.clone(), id);

        let class_sig = ClassSignature::new(names::DEFAULT_ARK_CLASS_NAME, signature, None);
        self.alloc_class(class_sig, ClassDecl::new(names::DEFAULT_ARK_CLASS_NAME), id, None);
        self.add_default_method(default_class);
        debug!(file = id.0, is_sdk, "file added");
        id
    }

    pub fn add_namespace(&mut self, owner: DeclOwner, name: impl Into<String>) -> NamespaceId {
        let name = name.into();
        let id = NamespaceId(self.namespaces.len() as u32);
        let (file, parent) = self.owner_location(owner);
        let file_sig = self.files[file.index()].signature.clone();
        let parent_sig = parent.map(|p| self.namespaces[p.index()].signature.clone());
        let signature = NamespaceSignature::new(name.clone(), file_sig.clone(), parent_sig);
        let default_class = ClassId(self.classes.len() as u32);

        let mut classes = IndexMap::new();
        classes.insert(names::DEFAULT_ARK_CLASS_NAME.to_string(), default_class);
        self.namespaces.push(ArkNamespace {
            id,
            signature: signature.clone(),
            declaring_file: file,
            parent,
            default_class,
            classes,
            namespaces: IndexMap::new(),
            exports: IndexMap::new(),
        });
        self.namespace_index.insert(signature.clone(), id);
        match owner {
            DeclOwner::File(f) => {
                self.files[f.index()].namespaces.insert(name, id);
            }
            DeclOwner::Namespace(ns) => {
                self.namespaces[ns.index()].namespaces.insert(name, id);
            }
        }

        let class_sig = ClassSignature::new(names::DEFAULT_ARK_CLASS_NAME, file_sig, Some(signature));
        self.alloc_class(class_sig, ClassDecl::new(names::DEFAULT_ARK_CLASS_NAME), file, Some(id));
        self.add_default_method(default_class);
        id
    }

    pub fn add_class(&mut self, owner: DeclOwner, decl: ClassDecl) -> ClassId {
        let (file, namespace) = self.owner_location(owner);
        let file_sig = self.files[file.index()].signature.clone();
        let ns_sig = namespace.map(|ns| self.namespaces[ns.index()].signature.clone());
        let name = decl.name.clone();
        let id = self.alloc_class(ClassSignature::new(name.clone(), file_sig, ns_sig), decl, file, namespace);
        match owner {
            DeclOwner::File(f) => {
                self.files[f.index()].classes.insert(name, id);
            }
            DeclOwner::Namespace(ns) => {
                self.namespaces[ns.index()].classes.insert(name, id);
            }
        }
        id
    }

    fn alloc_class(
        &mut self,
        signature: ClassSignature,
        decl: ClassDecl,
        file: FileId,
        namespace: Option<NamespaceId>,
    ) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.class_index.insert(signature.clone(), id);
        self.classes.push(ArkClass::new(id, signature, decl, file, namespace));
        id
    }

    fn owner_location(&self, owner: DeclOwner) -> (FileId, Option<NamespaceId>) {
        match owner {
            DeclOwner::File(file) => (file, None),
            DeclOwner::Namespace(ns) => (self.namespaces[ns.index()].declaring_file, Some(ns)),
        }
    }

    fn add_default_method(&mut self, class: ClassId) {
        let decl = MethodDecl::new(names::DEFAULT_ARK_METHOD_NAME).implement(Vec::new(), Type::Void);
        let id = self.add_method(class, decl);
        self.classes[class.index()].default_method = Some(id);
    }

    /// Adds a method to `class`.
    ///
    /// A method with an implementation gets a body whose prologue binds
    /// `this` and one local per parameter (`a = parameter0: T`).
    pub fn add_method(&mut self, class: ClassId, decl: MethodDecl) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        let class_sig = self.classes[class.index()].signature.clone();
        let is_static = decl.modifiers.contains(Modifiers::STATIC);
        let to_signature = |sub: &MethodSubSignature| {
            let mut sub = sub.clone();
            sub.is_static = is_static;
            MethodSignature::new(class_sig.clone(), sub)
        };
        let declared: Vec<MethodSignature> = decl.declare_signatures.iter().map(&to_signature).collect();
        let implementation = decl.implementation.as_ref().map(&to_signature);

        self.methods
            .push(ArkMethod::new(id, class, &decl, declared, implementation.clone()));

        let ark_class = &mut self.classes[class.index()];
        let table = if is_static {
            &mut ark_class.static_methods
        } else {
            &mut ark_class.methods
        };
        if table.insert(decl.name.clone(), id).is_some() {
            debug!(method = %decl.name, "method redeclared, later declaration wins");
        }

        if let Some(signature) = implementation {
            let this_ty = self.classes[class.index()].class_type();
            self.methods[id.index()].body = Some(MethodBody {
                cfg: super::Cfg {
                    blocks: vec![BasicBlock::default()],
                },
                ..MethodBody::default()
            });
            let this_local = self.add_local(id, names::THIS_NAME, this_ty.clone());
            let this_stmt = self.push_stmt(
                id,
                StmtKind::Assign {
                    left: Value::Local(this_local),
                    right: Value::Ref(Box::new(Ref::This { ty: this_ty })),
                },
            );
            self.locals[this_local.index()].set_declaring_stmt(this_stmt);
            for (index, param) in signature.sub.parameters.iter().enumerate() {
                let local = self.add_local(id, param.name.clone(), param.ty.clone());
                self.locals[local.index()].mark_parameter();
                let stmt = self.push_stmt(
                    id,
                    StmtKind::Assign {
                        left: Value::Local(local),
                        right: Value::Ref(Box::new(Ref::Parameter {
                            index,
                            ty: param.ty.clone(),
                        })),
                    },
                );
                self.locals[local.index()].set_declaring_stmt(stmt);
            }
        }
        id
    }

    pub fn add_field(&mut self, class: ClassId, decl: FieldDecl) -> FieldId {
        let id = FieldId(self.fields.len() as u32);
        let is_static = decl.modifiers.contains(Modifiers::STATIC);
        let ark_class = &mut self.classes[class.index()];
        let signature = FieldSignature::new(
            decl.name.clone(),
            BaseSignature::Class(ark_class.signature.clone()),
            decl.ty.clone(),
            is_static,
        );
        if is_static {
            ark_class.static_fields.insert(decl.name.clone(), id);
        } else {
            ark_class.fields.insert(decl.name.clone(), id);
        }
        self.fields.push(ArkField::new(id, class, &decl, signature));
        id
    }

    /// Adds a local to `method`'s body, creating an empty body if needed.
    /// An existing local with the same name is returned unchanged.
    pub fn add_local(&mut self, method: MethodId, name: impl Into<String>, ty: Type) -> LocalId {
        let name = name.into();
        let next = LocalId(self.locals.len() as u32);
        let body = self.methods[method.index()]
            .body
            .get_or_insert_with(MethodBody::default);
        if let Some(existing) = body.locals.get(&name) {
            return *existing;
        }
        body.locals.insert(name.clone(), next);
        self.locals.push(Local::new(next, name, method, ty));
        next
    }

    /// Declares `type name<generics> = original` in `method`'s body.
    pub fn add_alias_type(
        &mut self,
        method: MethodId,
        name: impl Into<String>,
        original: Type,
        generics: Vec<GenericType>,
    ) -> Rc<AliasType> {
        let name = name.into();
        let ark_method = &self.methods[method.index()];
        let declaring_method = ark_method
            .signature()
            .unwrap_or_else(|| MethodSignature::unknown(ark_method.name.clone()));
        let alias = Rc::new(
            AliasType::new(
                name.clone(),
                original,
                AliasTypeSignature {
                    name: name.clone(),
                    declaring_method,
                },
            )
            .with_generics(generics),
        );
        self.methods[method.index()]
            .body
            .get_or_insert_with(MethodBody::default)
            .alias_types
            .insert(name, Rc::clone(&alias));
        alias
    }

    pub fn next_stmt_id(&mut self) -> StmtId {
        let id = StmtId(self.next_stmt);
        self.next_stmt += 1;
        id
    }

    /// Appends a statement to the last block of `method`'s body.
    pub fn push_stmt(&mut self, method: MethodId, kind: StmtKind) -> StmtId {
        self.push_stmt_with_text(method, kind, None)
    }

    pub fn push_stmt_with_text(
        &mut self,
        method: MethodId,
        kind: StmtKind,
        original_text: Option<&str>,
    ) -> StmtId {
        let id = self.next_stmt_id();
        let stmt = Stmt {
            id,
            kind,
            original_text: original_text.map(str::to_string),
            position: None,
        };
        let body = self.methods[method.index()]
            .body
            .get_or_insert_with(MethodBody::default);
        if body.cfg.blocks.is_empty() {
            body.cfg.blocks.push(BasicBlock::default());
        }
        if let Some(block) = body.cfg.blocks.last() {
            block.stmts.borrow_mut().push(stmt);
        }
        id
    }

    /// Starts a new basic block in `method`; later statements go there.
    pub fn add_block(&mut self, method: MethodId, predecessors: &[usize]) -> usize {
        let body = self.methods[method.index()]
            .body
            .get_or_insert_with(MethodBody::default);
        let index = body.cfg.blocks.len();
        body.cfg.blocks.push(BasicBlock::default());
        for pred in predecessors {
            if let Some(block) = body.cfg.blocks.get_mut(*pred) {
                block.successors.push(index);
            }
        }
        index
    }

    pub fn push_field_initializer(
        &mut self,
        field: FieldId,
        kind: StmtKind,
        original_text: Option<&str>,
    ) -> StmtId {
        let id = self.next_stmt_id();
        self.fields[field.index()].push_initializer(Stmt {
            id,
            kind,
            original_text: original_text.map(str::to_string),
            position: None,
        });
        id
    }

    pub fn add_import(&mut self, file: FileId, decl: ImportDecl) -> ImportId {
        let id = ImportId(self.imports.len() as u32);
        self.imports.push(ImportInfo {
            id,
            clause_name: decl.clause_name,
            kind: decl.kind,
            from: decl.from,
            name_before_as: decl.name_before_as,
            declaring_file: file,
            lazy_export: OnceCell::new(),
        });
        self.files[file.index()].imports.push(id);
        id
    }

    pub fn add_export(&mut self, owner: DeclOwner, decl: ExportDecl) -> ExportId {
        let id = ExportId(self.exports.len() as u32);
        let (file, namespace) = self.owner_location(owner);
        let clause = decl.clause_name.clone();
        self.exports.push(ExportInfo {
            id,
            clause_name: decl.clause_name,
            name_before_as: decl.name_before_as,
            from: decl.from,
            declaring_file: file,
            declaring_namespace: namespace,
            target: OnceCell::new(),
        });
        // `export * from` entries share a clause name; key them by id.
        let key = if clause == names::NAMESPACE_IMPORT_NAME {
            format!("{clause}#{}", id.0)
        } else {
            clause
        };
        match owner {
            DeclOwner::File(f) => {
                self.files[f.index()].exports.insert(key, id);
            }
            DeclOwner::Namespace(ns) => {
                self.namespaces[ns.index()].exports.insert(key, id);
            }
        }
        id
    }
}

// =============================================================================
// Global declaration table (written by the SDK merge phase)
// =============================================================================

impl Scene {
    pub fn set_sdk_global(&mut self, name: impl Into<String>, target: ExportTarget) {
        self.sdk_globals.insert(name.into(), target);
    }

    pub fn remove_sdk_global(&mut self, name: &str) -> Option<ExportTarget> {
        self.sdk_globals.shift_remove(name)
    }

    /// Makes an existing method reachable from another class's member table
    /// without changing its declaring class.
    pub fn attach_method(&mut self, class: ClassId, method: MethodId) {
        let Some(ark_method) = self.methods.get(method.index()) else {
            return;
        };
        let name = ark_method.name.clone();
        let is_static = ark_method.is_static();
        if let Some(ark_class) = self.classes.get_mut(class.index()) {
            let table = if is_static {
                &mut ark_class.static_methods
            } else {
                &mut ark_class.methods
            };
            table.insert(name, method);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/scene_tests.rs"]
mod tests;
