use super::*;
use crate::model::{ClassCategory, FieldCategory, InvokeExpr};
use crate::signature::MethodParameter;

#[test]
fn test_file_has_default_class_and_method() {
    let mut scene = Scene::new();
    let file = scene.add_file("app", "entry/Index.ets");
    let ark_file = scene.file(file).unwrap();
    let default_class = scene.class(ark_file.default_class).unwrap();
    assert!(default_class.is_default());
    let method = scene.method(default_class.default_method().unwrap()).unwrap();
    assert!(method.is_default());
    assert!(method.body().is_some());
    assert!(!ark_file.is_sdk);
}

#[test]
fn test_sdk_file_is_registered_per_project() {
    let mut scene = Scene::new();
    let a = scene.add_sdk_file("openharmony", "api/@ohos.router.d.ts");
    let b = scene.add_sdk_file("openharmony", "api/@ohos.url.d.ts");
    scene.add_file("app", "a.ets");
    assert!(scene.is_sdk_project("openharmony"));
    assert!(!scene.is_sdk_project("app"));
    assert_eq!(scene.project_sdk_map()["openharmony"], vec![a, b]);
    assert!(scene.file(a).unwrap().is_sdk);
}

#[test]
fn test_class_lookup_by_signature() {
    let mut scene = Scene::new();
    let file = scene.add_file("app", "a.ets");
    let ns = scene.add_namespace(DeclOwner::File(file), "outer");
    let class = scene.add_class(DeclOwner::Namespace(ns), ClassDecl::new("Foo"));
    let sig = scene.class(class).unwrap().signature.clone();
    assert_eq!(sig.qualified_name(), "outer.Foo");
    assert_eq!(scene.get_class(&sig).map(|c| c.id), Some(class));
    assert_eq!(scene.namespace(ns).unwrap().class("Foo"), Some(class));
}

#[test]
fn test_static_and_instance_members_are_split() {
    let mut scene = Scene::new();
    let file = scene.add_file("app", "a.ets");
    let class = scene.add_class(DeclOwner::File(file), ClassDecl::new("Counter"));
    let count = scene.add_field(
        class,
        FieldDecl::new("count", Type::Number).with_modifiers(Modifiers::STATIC),
    );
    let value = scene.add_field(class, FieldDecl::new("value", Type::Number));
    let create = scene.add_method(
        class,
        MethodDecl::new("create")
            .with_modifiers(Modifiers::STATIC)
            .implement(Vec::new(), Type::Void),
    );

    let ark_class = scene.class(class).unwrap();
    assert_eq!(ark_class.static_field("count"), Some(count));
    assert_eq!(ark_class.field("value"), Some(value));
    assert_eq!(ark_class.method("create"), None);
    assert_eq!(ark_class.static_method("create"), Some(create));
    assert!(scene.field(count).unwrap().signature().is_static);

    let sig = scene.method(create).unwrap().signature().unwrap();
    assert!(sig.sub.is_static);
    assert_eq!(scene.get_method(&sig).map(|m| m.id), Some(create));
}

#[test]
fn test_enum_members() {
    let mut scene = Scene::new();
    let file = scene.add_file("app", "a.ets");
    let class = scene.add_class(
        DeclOwner::File(file),
        ClassDecl::new("Color").with_category(ClassCategory::Enum),
    );
    let red = scene.add_field(class, FieldDecl::new("RED", Type::Number).enum_member());
    assert_eq!(scene.field(red).unwrap().category, FieldCategory::EnumMember);
}

#[test]
fn test_add_local_returns_existing() {
    let mut scene = Scene::new();
    let file = scene.add_file("app", "a.ets");
    let class = scene.add_class(DeclOwner::File(file), ClassDecl::new("A"));
    let method = scene.add_method(class, MethodDecl::new("run").implement(Vec::new(), Type::Void));
    let first = scene.add_local(method, "x", Type::Unknown);
    let second = scene.add_local(method, "x", Type::Number);
    assert_eq!(first, second);
    assert_eq!(*scene.local(first).unwrap().ty(), Type::Unknown);
}

#[test]
fn test_statements_get_unique_ids() {
    let mut scene = Scene::new();
    let file = scene.add_file("app", "a.ets");
    let class = scene.add_class(DeclOwner::File(file), ClassDecl::new("A"));
    let method = scene.add_method(
        class,
        MethodDecl::new("run").implement(vec![MethodParameter::new("n", Type::Number)], Type::Void),
    );
    let call = InvokeExpr::static_call(MethodSignature::unknown("log"), Vec::new());
    let a = scene.push_stmt(method, StmtKind::Invoke(call));
    let b = scene.push_stmt_with_text(method, StmtKind::ReturnVoid, Some("return"));
    assert_ne!(a, b);

    let stmts = scene.method(method).unwrap().body().unwrap().cfg.stmts();
    // this + one parameter prologue, then the two pushed statements.
    assert_eq!(stmts.len(), 4);
    assert_eq!(stmts[3].original_text.as_deref(), Some("return"));
}

#[test]
fn test_new_block_receives_later_statements() {
    let mut scene = Scene::new();
    let file = scene.add_file("app", "a.ets");
    let class = scene.add_class(DeclOwner::File(file), ClassDecl::new("A"));
    let method = scene.add_method(class, MethodDecl::new("run").implement(Vec::new(), Type::Void));
    let block = scene.add_block(method, &[0]);
    scene.push_stmt(method, StmtKind::ReturnVoid);

    let cfg = &scene.method(method).unwrap().body().unwrap().cfg;
    assert_eq!(cfg.blocks[0].successors, vec![block]);
    assert_eq!(cfg.blocks[block].len(), 1);
}

#[test]
fn test_sdk_globals_keep_insertion_order() {
    let mut scene = Scene::new();
    let file = scene.add_sdk_file("sdk", "api/a.d.ts");
    let class = scene.add_class(DeclOwner::File(file), ClassDecl::new("Foo"));
    scene.set_sdk_global("Foo", ExportTarget::Class(class));
    scene.set_sdk_global("Bar", ExportTarget::Module(file));
    let names: Vec<&str> = scene.sdk_globals().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["Foo", "Bar"]);
    assert_eq!(scene.remove_sdk_global("Foo"), Some(ExportTarget::Class(class)));
    assert!(scene.get_sdk_global("Foo").is_none());
}
