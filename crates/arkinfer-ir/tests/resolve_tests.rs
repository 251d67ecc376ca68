use super::*;
use crate::model::{ClassDecl, ExportDecl, ImportDecl, MethodDecl};
use crate::types::Type;

#[test]
fn test_relative_module_with_extension_candidates() {
    let mut scene = Scene::new();
    let index = scene.add_file("app", "entry/pages/Index.ets");
    let util = scene.add_file("app", "entry/common/util.ets");
    let lib = scene.add_file("app", "entry/lib/index.ts");
    assert_eq!(scene.resolve_module("../common/util", index), Some(util));
    assert_eq!(scene.resolve_module("./../lib", index), Some(lib));
    assert_eq!(scene.resolve_module("./missing", index), None);
}

#[test]
fn test_relative_module_stays_in_project() {
    let mut scene = Scene::new();
    let index = scene.add_file("app", "Index.ets");
    scene.add_file("other", "util.ets");
    assert_eq!(scene.resolve_module("./util", index), None);
}

#[test]
fn test_bare_module_matches_sdk_stem() {
    let mut scene = Scene::new();
    let router = scene.add_sdk_file("openharmony", "api/@ohos.router.d.ts");
    let index = scene.add_file("app", "Index.ets");
    assert_eq!(scene.resolve_module("@ohos.router", index), Some(router));
    assert_eq!(scene.resolve_module("@ohos.url", index), None);
}

#[test]
fn test_named_import_resolves_exported_class() {
    let mut scene = Scene::new();
    let model = scene.add_file("app", "model.ets");
    let user = scene.add_class(DeclOwner::File(model), ClassDecl::new("User"));
    scene.add_export(DeclOwner::File(model), ExportDecl::new("User"));

    let index = scene.add_file("app", "Index.ets");
    let import = scene.add_import(index, ImportDecl::named("User", "./model"));
    assert_eq!(scene.find_import(index, "User"), Some(import));
    assert_eq!(scene.resolve_import(import), Some(ExportTarget::Class(user)));
    // memoized
    assert!(scene.import(import).unwrap().lazy_export.get().is_some());
}

#[test]
fn test_renamed_and_default_imports() {
    let mut scene = Scene::new();
    let model = scene.add_file("app", "model.ets");
    let user = scene.add_class(DeclOwner::File(model), ClassDecl::new("User"));
    scene.add_export(DeclOwner::File(model), ExportDecl::new("default").renamed("User"));
    scene.add_export(DeclOwner::File(model), ExportDecl::new("Person").renamed("User"));

    let index = scene.add_file("app", "Index.ets");
    let default = scene.add_import(index, ImportDecl::default_import("U", "./model"));
    let renamed = scene.add_import(index, ImportDecl::named("P", "./model").renamed("Person"));
    assert_eq!(scene.resolve_import(default), Some(ExportTarget::Class(user)));
    assert_eq!(scene.resolve_import(renamed), Some(ExportTarget::Class(user)));
}

#[test]
fn test_namespace_import_is_module() {
    let mut scene = Scene::new();
    let model = scene.add_file("app", "model.ets");
    let index = scene.add_file("app", "Index.ets");
    let import = scene.add_import(index, ImportDecl::namespace("m", "./model"));
    assert_eq!(scene.resolve_import(import), Some(ExportTarget::Module(model)));
}

#[test]
fn test_re_export_chain_and_star_export() {
    let mut scene = Scene::new();
    let base = scene.add_file("app", "base.ets");
    let shape = scene.add_class(DeclOwner::File(base), ClassDecl::new("Shape"));
    scene.add_export(DeclOwner::File(base), ExportDecl::new("Shape"));

    let mid = scene.add_file("app", "mid.ets");
    scene.add_export(DeclOwner::File(mid), ExportDecl::new("Shape").from_module("./base"));

    let barrel = scene.add_file("app", "index.ets");
    scene.add_export(DeclOwner::File(barrel), ExportDecl::new("*").from_module("./mid"));

    assert_eq!(scene.find_export_in_file(barrel, "Shape"), Some(ExportTarget::Class(shape)));
}

#[test]
fn test_cyclic_star_exports_terminate() {
    let mut scene = Scene::new();
    let a = scene.add_file("app", "a.ets");
    let b = scene.add_file("app", "b.ets");
    scene.add_export(DeclOwner::File(a), ExportDecl::new("*").from_module("./b"));
    scene.add_export(DeclOwner::File(b), ExportDecl::new("*").from_module("./a"));
    assert_eq!(scene.find_export_in_file(a, "Missing"), None);
}

#[test]
fn test_declaration_fallback_finds_functions_and_aliases() {
    let mut scene = Scene::new();
    let file = scene.add_file("app", "a.ets");
    let default_class = scene.file(file).unwrap().default_class;
    let func = scene.add_method(default_class, MethodDecl::new("helper").implement(Vec::new(), Type::Void));
    let default_method = scene.class(default_class).unwrap().default_method().unwrap();
    let alias = scene.add_alias_type(default_method, "Id", Type::String, Vec::new());

    assert_eq!(scene.find_declaration(DeclOwner::File(file), "helper"), Some(ExportTarget::Method(func)));
    assert_eq!(scene.find_declaration(DeclOwner::File(file), "Id"), Some(ExportTarget::Alias(alias)));
    assert_eq!(scene.find_declaration(DeclOwner::File(file), "this"), None);
}

#[test]
fn test_scope_walks_namespaces_outward() {
    let mut scene = Scene::new();
    let file = scene.add_file("app", "a.ets");
    let top = scene.add_class(DeclOwner::File(file), ClassDecl::new("Top"));
    let outer = scene.add_namespace(DeclOwner::File(file), "outer");
    let inner = scene.add_namespace(DeclOwner::Namespace(outer), "inner");
    let shadow = scene.add_class(DeclOwner::Namespace(outer), ClassDecl::new("Top"));
    let here = scene.add_class(DeclOwner::Namespace(inner), ClassDecl::new("Here"));

    assert_eq!(scene.find_class_in_scope("Top", here), Some(shadow));
    assert_eq!(scene.find_class_in_scope("Top", top), Some(top));
    assert_eq!(scene.find_namespace_in_scope("inner", here), Some(inner));
    assert_eq!(scene.find_class_in_scope("%dflt", here), None);
    assert_eq!(scene.owner_chain(here).len(), 3);
}

#[test]
fn test_alias_lookup_through_outer_methods() {
    let mut scene = Scene::new();
    let file = scene.add_file("app", "a.ets");
    let class = scene.add_class(DeclOwner::File(file), ClassDecl::new("A"));
    let outer = scene.add_method(class, MethodDecl::new("outer").implement(Vec::new(), Type::Void));
    let inner = scene.add_method(
        class,
        MethodDecl::new("%AM0$outer").nested_in(outer).implement(Vec::new(), Type::Void),
    );
    let alias = scene.add_alias_type(outer, "Local", Type::Number, Vec::new());
    let found = scene.find_alias_in_scope("Local", Some(inner), class).unwrap();
    assert!(Rc::ptr_eq(&found, &alias));
    assert!(scene.find_alias_in_scope("Missing", Some(inner), class).is_none());
}
