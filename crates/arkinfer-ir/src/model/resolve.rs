//! Module specifier, import/export and lexical scope resolution on a [`Scene`].

use std::rc::Rc;

use smallvec::SmallVec;
use tracing::{trace, warn};

use arkinfer_common::names;
use arkinfer_common::{RecursionGuard, RecursionProfile};

use super::{ClassId, DeclOwner, ExportId, ExportTarget, FileId, ImportId, ImportKind, MethodId, NamespaceId, Scene};
use crate::signature::FileSignature;
use crate::types::AliasType;

const SOURCE_EXTENSIONS: [&str; 7] = ["", ".ets", ".ts", ".d.ets", ".d.ts", "/index.ets", "/index.ts"];
const STRIPPED_EXTENSIONS: [&str; 4] = [".d.ets", ".d.ts", ".ets", ".ts"];

type ExportGuard = RecursionGuard<FileId>;

// =============================================================================
// Module specifiers
// =============================================================================

impl Scene {
    /// Resolves a module specifier written in `importing`.
    ///
    /// Relative specifiers are joined with the importing file's directory and
    /// tried with the usual source extensions in the same project. Bare
    /// specifiers name an SDK file by its stem (`@ohos.router` ->
    /// `api/@ohos.router.d.ts`).
    pub fn resolve_module(&self, specifier: &str, importing: FileId) -> Option<FileId> {
        let file = self.file(importing)?;
        if specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/') {
            let joined = join_relative(file.name(), specifier);
            return SOURCE_EXTENSIONS.iter().find_map(|ext| {
                self.file_id(&FileSignature::new(file.project_name(), format!("{joined}{ext}")))
            });
        }
        self.project_sdk_map()
            .values()
            .flatten()
            .copied()
            .find(|id| self.file(*id).is_some_and(|f| file_stem(f.name()) == specifier))
    }
}

fn join_relative(importing_file: &str, specifier: &str) -> String {
    let mut parts: SmallVec<[&str; 8]> = importing_file.split('/').collect();
    parts.pop();
    for segment in specifier.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    STRIPPED_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
}

// =============================================================================
// Imports and exports
// =============================================================================

impl Scene {
    /// The import in `file` whose clause name is `name`.
    pub fn find_import(&self, file: FileId, name: &str) -> Option<ImportId> {
        self.file(file)?
            .import_ids()
            .iter()
            .copied()
            .find(|id| self.import(*id).is_some_and(|i| i.clause_name == name))
    }

    /// The declaration an import binds to. Memoized once found.
    pub fn resolve_import(&self, id: ImportId) -> Option<ExportTarget> {
        let import = self.import(id)?;
        if let Some(target) = import.lazy_export.get() {
            return Some(target.clone());
        }
        let file = self.resolve_module(&import.from, import.declaring_file)?;
        let target = match import.kind {
            ImportKind::Namespace => ExportTarget::Module(file),
            ImportKind::Named | ImportKind::Default => {
                self.find_export_in_file(file, import.imported_name())?
            }
        };
        trace!(import = %import.clause_name, from = %import.from, "import resolved");
        let _ = import.lazy_export.set(target.clone());
        Some(target)
    }

    /// What `file` exposes under `name`, following re-export chains.
    pub fn find_export_in_file(&self, file: FileId, name: &str) -> Option<ExportTarget> {
        let mut guard = ExportGuard::with_profile(RecursionProfile::ReExportChain);
        let found = self.export_in_file_guarded(file, name, &mut guard);
        if guard.is_exceeded() {
            warn!(file = file.0, name, "re-export chain limit reached");
        }
        found
    }

    pub fn resolve_export(&self, id: ExportId) -> Option<ExportTarget> {
        let mut guard = ExportGuard::with_profile(RecursionProfile::ReExportChain);
        let found = self.resolve_export_guarded(id, &mut guard);
        if guard.is_exceeded() {
            warn!(export = id.0, "re-export chain limit reached");
        }
        found
    }

    /// What namespace `ns` exposes under `name`.
    pub fn find_export_in_namespace(&self, ns: NamespaceId, name: &str) -> Option<ExportTarget> {
        let namespace = self.namespace(ns)?;
        match namespace.export(name) {
            Some(id) => self.resolve_export(id),
            None => self.find_declaration(DeclOwner::Namespace(ns), name),
        }
    }

    fn export_in_file_guarded(&self, file: FileId, name: &str, guard: &mut ExportGuard) -> Option<ExportTarget> {
        if guard.enter(file).is_denied() {
            return None;
        }
        let found = self.export_in_file_step(file, name, guard);
        guard.leave(file);
        found
    }

    fn export_in_file_step(&self, file: FileId, name: &str, guard: &mut ExportGuard) -> Option<ExportTarget> {
        let ark_file = self.file(file)?;
        if let Some(id) = ark_file.export(name) {
            return self.resolve_export_guarded(id, guard);
        }
        let star_sources: SmallVec<[String; 2]> = ark_file
            .export_ids()
            .filter_map(|id| self.export(id))
            .filter(|e| e.clause_name == names::NAMESPACE_IMPORT_NAME)
            .filter_map(|e| e.from.clone())
            .collect();
        for from in star_sources {
            let Some(source) = self.resolve_module(&from, file) else {
                continue;
            };
            if let Some(found) = self.export_in_file_guarded(source, name, guard) {
                return Some(found);
            }
        }
        if name == names::DEFAULT_EXPORT_NAME {
            return None;
        }
        // Declaration files often omit `export` on ambient declarations.
        self.find_declaration(DeclOwner::File(file), name)
    }

    fn resolve_export_guarded(&self, id: ExportId, guard: &mut ExportGuard) -> Option<ExportTarget> {
        let export = self.export(id)?;
        if let Some(target) = export.target.get() {
            return Some(target.clone());
        }
        let target = match &export.from {
            Some(from) => {
                let source = self.resolve_module(from, export.declaring_file)?;
                if export.local_name() == names::NAMESPACE_IMPORT_NAME {
                    ExportTarget::Module(source)
                } else {
                    self.export_in_file_guarded(source, export.local_name(), guard)?
                }
            }
            None => {
                let owner = export
                    .declaring_namespace
                    .map_or(DeclOwner::File(export.declaring_file), DeclOwner::Namespace);
                self.find_declaration(owner, export.local_name())?
            }
        };
        let _ = export.target.set(target.clone());
        Some(target)
    }

    /// A declaration named `name` directly inside `owner`: class, namespace,
    /// top-level function, top-level variable or type alias.
    pub fn find_declaration(&self, owner: DeclOwner, name: &str) -> Option<ExportTarget> {
        if let Some(class) = self.class_in_owner(owner, name) {
            return Some(ExportTarget::Class(class));
        }
        if let Some(ns) = self.namespace_in_owner(owner, name) {
            return Some(ExportTarget::Namespace(ns));
        }
        let default_class = self.class(self.default_class_of(owner)?)?;
        if let Some(method) = default_class.any_method(name) {
            return Some(ExportTarget::Method(method));
        }
        let body = self.method(default_class.default_method()?)?.body()?;
        if let Some(local) = body.local(name).filter(|id| self.local(*id).is_some_and(|l| !l.is_this())) {
            return Some(ExportTarget::Local(local));
        }
        body.alias_type(name).map(|alias| ExportTarget::Alias(Rc::clone(alias)))
    }
}

// =============================================================================
// Lexical scope
// =============================================================================

impl Scene {
    /// Enclosing declaration owners of `class`, innermost namespace first and
    /// the file last.
    pub fn owner_chain(&self, class: ClassId) -> SmallVec<[DeclOwner; 4]> {
        let mut chain = SmallVec::new();
        let Some(ark_class) = self.class(class) else {
            return chain;
        };
        let mut ns = ark_class.declaring_namespace;
        while let Some(id) = ns {
            if chain.len() > arkinfer_common::limits::MAX_NAME_RESOLUTION_DEPTH as usize {
                break;
            }
            chain.push(DeclOwner::Namespace(id));
            ns = self.namespace(id).and_then(|n| n.parent);
        }
        chain.push(DeclOwner::File(ark_class.declaring_file));
        chain
    }

    pub fn class_in_owner(&self, owner: DeclOwner, name: &str) -> Option<ClassId> {
        if name == names::DEFAULT_ARK_CLASS_NAME {
            return None;
        }
        match owner {
            DeclOwner::File(file) => self.file(file)?.class(name),
            DeclOwner::Namespace(ns) => self.namespace(ns)?.class(name),
        }
    }

    pub fn namespace_in_owner(&self, owner: DeclOwner, name: &str) -> Option<NamespaceId> {
        match owner {
            DeclOwner::File(file) => self.file(file)?.namespace(name),
            DeclOwner::Namespace(ns) => self.namespace(ns)?.namespace(name),
        }
    }

    /// A class visible from `from` by simple name.
    pub fn find_class_in_scope(&self, name: &str, from: ClassId) -> Option<ClassId> {
        self.owner_chain(from)
            .into_iter()
            .find_map(|owner| self.class_in_owner(owner, name))
    }

    pub fn find_namespace_in_scope(&self, name: &str, from: ClassId) -> Option<NamespaceId> {
        self.owner_chain(from)
            .into_iter()
            .find_map(|owner| self.namespace_in_owner(owner, name))
    }

    /// A top-level function visible from `from` by simple name.
    pub fn find_function_in_scope(&self, name: &str, from: ClassId) -> Option<MethodId> {
        if name == names::DEFAULT_ARK_METHOD_NAME {
            return None;
        }
        self.owner_chain(from).into_iter().find_map(|owner| {
            let default_class = self.class(self.default_class_of(owner)?)?;
            default_class.any_method(name)
        })
    }

    /// A type alias visible from `method`: its own body, the bodies of the
    /// methods it is nested in, then the default methods of the enclosing
    /// namespaces and file.
    pub fn find_alias_in_scope(&self, name: &str, method: Option<MethodId>, class: ClassId) -> Option<Rc<AliasType>> {
        let mut current = method;
        let mut depth = 0;
        while let Some(id) = current {
            let ark_method = self.method(id)?;
            if let Some(alias) = ark_method.body().and_then(|b| b.alias_type(name)) {
                return Some(Rc::clone(alias));
            }
            depth += 1;
            if depth > arkinfer_common::limits::MAX_NAME_RESOLUTION_DEPTH {
                break;
            }
            current = ark_method.outer_method;
        }
        self.owner_chain(class).into_iter().find_map(|owner| {
            let default_class = self.class(self.default_class_of(owner)?)?;
            let body = self.method(default_class.default_method()?)?.body()?;
            body.alias_type(name).map(Rc::clone)
        })
    }

    /// Default methods of the namespaces and file enclosing `class`,
    /// innermost first.
    pub fn enclosing_default_methods(&self, class: ClassId) -> SmallVec<[MethodId; 4]> {
        self.owner_chain(class)
            .into_iter()
            .filter_map(|owner| self.class(self.default_class_of(owner)?)?.default_method())
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/resolve_tests.rs"]
mod tests;
