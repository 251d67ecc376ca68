//! Global table construction from SDK declaration files.

use arkinfer_checker::{InferenceOptions, merge_sdk_globals};
use arkinfer_ir::model::{ClassDecl, ClassId, DeclOwner, ExportTarget, MethodDecl, Scene};
use arkinfer_ir::{MethodParameter, Type};

fn method_names(scene: &Scene, class: ClassId) -> Vec<String> {
    let ark_class = scene.class(class).unwrap();
    let mut names: Vec<String> = ark_class
        .method_ids()
        .map(|m| scene.method(m).unwrap().name.clone())
        .collect();
    names.sort();
    names
}

fn global_class(scene: &Scene, name: &str) -> ClassId {
    match scene.get_sdk_global(name) {
        Some(ExportTarget::Class(id)) => *id,
        other => panic!("expected global class {name}, got {other:?}"),
    }
}

#[test]
fn test_interface_then_class_share_one_method_table() {
    let mut scene = Scene::new();
    let first = scene.add_sdk_file("sdk", "api/a.d.ts");
    let interface = scene.add_class(DeclOwner::File(first), ClassDecl::interface("Foo"));
    scene.add_method(interface, MethodDecl::new("bar").declare(Vec::new(), Type::Void));
    let second = scene.add_sdk_file("sdk", "api/b.d.ts");
    let class = scene.add_class(DeclOwner::File(second), ClassDecl::new("Foo"));
    scene.add_method(class, MethodDecl::new("baz").declare(Vec::new(), Type::Void));

    let diagnostics = merge_sdk_globals(&mut scene, &InferenceOptions::default());
    assert!(diagnostics.is_empty());
    assert_eq!(global_class(&scene, "Foo"), class);
    assert_eq!(method_names(&scene, class), vec!["bar", "baz"]);
}

#[test]
fn test_class_then_interface_share_one_method_table() {
    let mut scene = Scene::new();
    let first = scene.add_sdk_file("sdk", "api/a.d.ts");
    let class = scene.add_class(DeclOwner::File(first), ClassDecl::new("Foo"));
    scene.add_method(class, MethodDecl::new("baz").declare(Vec::new(), Type::Void));
    let second = scene.add_sdk_file("sdk", "api/b.d.ts");
    let interface = scene.add_class(DeclOwner::File(second), ClassDecl::interface("Foo"));
    scene.add_method(interface, MethodDecl::new("bar").declare(Vec::new(), Type::Void));

    merge_sdk_globals(&mut scene, &InferenceOptions::default());
    assert_eq!(global_class(&scene, "Foo"), class);
    assert_eq!(method_names(&scene, class), vec!["bar", "baz"]);
}

#[test]
fn test_same_named_methods_merge_overloads() {
    let mut scene = Scene::new();
    let first = scene.add_sdk_file("sdk", "api/a.d.ts");
    let interface = scene.add_class(DeclOwner::File(first), ClassDecl::interface("Storage"));
    scene.add_method(
        interface,
        MethodDecl::new("get").declare(vec![MethodParameter::new("key", Type::String)], Type::String),
    );
    let second = scene.add_sdk_file("sdk", "api/b.d.ts");
    let class = scene.add_class(DeclOwner::File(second), ClassDecl::new("Storage"));
    let get = scene.add_method(
        class,
        MethodDecl::new("get").declare(vec![MethodParameter::new("index", Type::Number)], Type::String),
    );

    merge_sdk_globals(&mut scene, &InferenceOptions::default());
    let signatures = scene.method(get).unwrap().declare_signatures();
    assert_eq!(signatures.len(), 2);
    let first_params: Vec<Type> = signatures.iter().map(|s| s.sub.parameters[0].ty.clone()).collect();
    assert_eq!(first_params, vec![Type::Number, Type::String]);
}

#[test]
fn test_function_overloads_collected_across_files() {
    let mut scene = Scene::new();
    let first = scene.add_sdk_file("sdk", "api/a.d.ts");
    let first_default = scene.file(first).unwrap().default_class;
    let print = scene.add_method(
        first_default,
        MethodDecl::new("print").declare(vec![MethodParameter::new("n", Type::Number)], Type::Void),
    );
    let second = scene.add_sdk_file("sdk", "api/b.d.ts");
    let second_default = scene.file(second).unwrap().default_class;
    scene.add_method(
        second_default,
        MethodDecl::new("print")
            .declare(vec![MethodParameter::new("s", Type::String)], Type::Void)
            .declare(vec![MethodParameter::new("n", Type::Number)], Type::Void),
    );

    merge_sdk_globals(&mut scene, &InferenceOptions::default());
    assert_eq!(scene.get_sdk_global("print"), Some(&ExportTarget::Method(print)));
    assert_eq!(scene.method(print).unwrap().declare_signatures().len(), 2);
}

#[test]
fn test_component_interface_merged_into_attribute_class() {
    let mut scene = Scene::new();
    let sdk = scene.add_sdk_file("sdk", "api/@internal/component/ets/button.d.ts");
    let interface = scene.add_class(DeclOwner::File(sdk), ClassDecl::interface("ButtonInterface"));
    scene.add_method(interface, MethodDecl::new("create").declare(Vec::new(), Type::Void));
    let attribute = scene.add_class(DeclOwner::File(sdk), ClassDecl::new("ButtonAttribute"));
    scene.add_method(attribute, MethodDecl::new("fontSize").declare(Vec::new(), Type::Void));
    let interface_sig = scene.class(interface).unwrap().signature.clone();
    let default_method = {
        let default_class = scene.file(sdk).unwrap().default_class;
        scene.class(default_class).unwrap().default_method().unwrap()
    };
    scene.add_local(default_method, "Button", Type::class(interface_sig));

    merge_sdk_globals(&mut scene, &InferenceOptions::default());
    assert_eq!(global_class(&scene, "Button"), attribute);
    assert_eq!(method_names(&scene, attribute), vec!["create", "fontSize"]);
}

#[test]
fn test_top_level_variables_and_namespaces_bound() {
    let mut scene = Scene::new();
    let sdk = scene.add_sdk_file("sdk", "api/global.d.ts");
    let console = scene.add_namespace(DeclOwner::File(sdk), "console");
    let default_method = {
        let default_class = scene.file(sdk).unwrap().default_class;
        scene.class(default_class).unwrap().default_method().unwrap()
    };
    let version = scene.add_local(default_method, "version", Type::String);

    merge_sdk_globals(&mut scene, &InferenceOptions::default());
    assert_eq!(scene.get_sdk_global("console"), Some(&ExportTarget::Namespace(console)));
    assert_eq!(scene.get_sdk_global("version"), Some(&ExportTarget::Local(version)));
}

#[test]
fn test_global_folders_filter_files() {
    let mut scene = Scene::new();
    let component = scene.add_sdk_file("sdk", "api/@internal/component/ets/text.d.ts");
    let text = scene.add_class(DeclOwner::File(component), ClassDecl::new("TextAttribute"));
    let module = scene.add_sdk_file("sdk", "api/@ohos.router.d.ts");
    scene.add_class(DeclOwner::File(module), ClassDecl::interface("RouterOptions"));

    let options = InferenceOptions {
        sdk_global_folders: vec!["component".to_string()],
        ..InferenceOptions::default()
    };
    merge_sdk_globals(&mut scene, &options);
    assert_eq!(global_class(&scene, "TextAttribute"), text);
    assert!(scene.get_sdk_global("RouterOptions").is_none());
}

#[test]
fn test_user_files_contribute_no_globals() {
    let mut scene = Scene::new();
    let app = scene.add_file("app", "entry/app.ets");
    scene.add_class(DeclOwner::File(app), ClassDecl::new("Page"));

    let diagnostics = merge_sdk_globals(&mut scene, &InferenceOptions::default());
    assert!(diagnostics.is_empty());
    assert_eq!(scene.sdk_globals().count(), 0);
}
