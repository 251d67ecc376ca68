use super::*;
use arkinfer_ir::model::{ClassCategory, ClassDecl, DeclOwner, FieldDecl, MethodDecl, MethodId, Modifiers, Scene};
use arkinfer_ir::ClassSignature;

fn method_scope(scene: &mut Scene) -> (MethodId, Scope) {
    let file = scene.add_file("app", "a.ets");
    let class = scene.add_class(DeclOwner::File(file), ClassDecl::new("Main"));
    let method = scene.add_method(class, MethodDecl::new("run").implement(Vec::new(), Type::Void));
    let scope = Scope::method(scene, method).unwrap();
    (method, scope)
}

#[test]
fn test_array_element_access_becomes_array_ref() {
    let mut scene = Scene::new();
    let (method, scope) = method_scope(&mut scene);
    let arr = scene.add_local(method, "arr", Type::array(Type::Number, 1));
    let i = scene.add_local(method, "i", Type::Number);

    let mut state = InferenceState::with_defaults(&scene);
    assert_eq!(
        state.infer_field_ref(arr, &FieldSignature::unknown("0"), scope),
        Some(Ref::Array {
            base: arr,
            index: Value::Constant(Constant::number("0")),
        })
    );
    assert_eq!(
        state.infer_field_ref(arr, &FieldSignature::unknown("i"), scope),
        Some(Ref::Array {
            base: arr,
            index: Value::Local(i),
        })
    );
}

#[test]
fn test_array_length_stays_field_ref() {
    let mut scene = Scene::new();
    let (method, scope) = method_scope(&mut scene);
    let arr = scene.add_local(method, "arr", Type::array(Type::String, 1));

    let mut state = InferenceState::with_defaults(&scene);
    let Some(Ref::InstanceField { base, field }) =
        state.infer_field_ref(arr, &FieldSignature::unknown("length"), scope)
    else {
        panic!("expected an instance field reference");
    };
    assert_eq!(base, arr);
    assert_eq!(field.ty, Type::Number);
}

#[test]
fn test_union_receiver_skips_nullish_members() {
    let mut scene = Scene::new();
    let (method, scope) = method_scope(&mut scene);
    let file = scene.class(scope.class).unwrap().declaring_file;
    let point = scene.add_class(DeclOwner::File(file), ClassDecl::new("Point"));
    scene.add_field(point, FieldDecl::new("x", Type::Number));
    let point_sig = scene.class(point).unwrap().signature.clone();
    let p = scene.add_local(method, "p", Type::union([Type::Null, Type::class(point_sig.clone())]));

    let mut state = InferenceState::with_defaults(&scene);
    let Some(Ref::InstanceField { field, .. }) =
        state.infer_field_ref(p, &FieldSignature::unknown("x"), scope)
    else {
        panic!("expected an instance field reference");
    };
    assert_eq!(field.declaring, BaseSignature::Class(point_sig));
    assert_eq!(field.ty, Type::Number);
    assert!(!field.is_static);
}

#[test]
fn test_static_field_through_class_name() {
    let mut scene = Scene::new();
    let (_, scope) = method_scope(&mut scene);
    let file = scene.class(scope.class).unwrap().declaring_file;
    let config = scene.add_class(DeclOwner::File(file), ClassDecl::new("Config"));
    scene.add_field(
        config,
        FieldDecl::new("mode", Type::String).with_modifiers(Modifiers::STATIC),
    );

    let unbound = FieldSignature::new(
        "mode",
        BaseSignature::Class(ClassSignature::unknown("Config")),
        Type::Unknown,
        true,
    );
    let mut state = InferenceState::with_defaults(&scene);
    let Some(Ref::StaticField { field }) = state.infer_static_field_ref(&unbound, scope) else {
        panic!("expected a static field reference");
    };
    let config_sig = scene.class(config).unwrap().signature.clone();
    assert_eq!(field.declaring, BaseSignature::Class(config_sig));
    assert_eq!(field.ty, Type::String);
}

#[test]
fn test_enum_member_typed_as_enum() {
    let mut scene = Scene::new();
    let (_, scope) = method_scope(&mut scene);
    let file = scene.class(scope.class).unwrap().declaring_file;
    let color = scene.add_class(
        DeclOwner::File(file),
        ClassDecl::new("Color").with_category(ClassCategory::Enum),
    );
    scene.add_field(
        color,
        FieldDecl::new("Red", Type::Unknown)
            .with_modifiers(Modifiers::STATIC)
            .enum_member(),
    );

    let unbound = FieldSignature::new(
        "Red",
        BaseSignature::Class(ClassSignature::unknown("Color")),
        Type::Unknown,
        true,
    );
    let mut state = InferenceState::with_defaults(&scene);
    let Some(Ref::StaticField { field }) = state.infer_static_field_ref(&unbound, scope) else {
        panic!("expected a static field reference");
    };
    let color_sig = scene.class(color).unwrap().signature.clone();
    assert_eq!(field.ty, Type::class(color_sig));
}

#[test]
fn test_settled_reference_is_left_alone() {
    let mut scene = Scene::new();
    let (method, scope) = method_scope(&mut scene);
    let file = scene.class(scope.class).unwrap().declaring_file;
    let point = scene.add_class(DeclOwner::File(file), ClassDecl::new("Point"));
    scene.add_field(point, FieldDecl::new("x", Type::Number));
    let point_sig = scene.class(point).unwrap().signature.clone();
    let p = scene.add_local(method, "p", Type::class(point_sig.clone()));

    let settled = FieldSignature::new("x", BaseSignature::Class(point_sig), Type::Number, false);
    let mut state = InferenceState::with_defaults(&scene);
    assert_eq!(state.infer_field_ref(p, &settled, scope), None);
}

#[test]
fn test_unknown_receiver_gives_nothing() {
    let mut scene = Scene::new();
    let (method, scope) = method_scope(&mut scene);
    let any = scene.add_local(method, "x", Type::Unknown);

    let mut state = InferenceState::with_defaults(&scene);
    assert_eq!(state.infer_field_ref(any, &FieldSignature::unknown("y"), scope), None);
    assert!(state.diagnostics().is_empty());
}

#[test]
fn test_nullish_only_union_receiver_gives_nothing() {
    let mut scene = Scene::new();
    let (method, scope) = method_scope(&mut scene);
    let maybe = scene.add_local(method, "maybe", Type::union([Type::Null, Type::Undefined]));

    let mut state = InferenceState::with_defaults(&scene);
    assert_eq!(state.infer_field_ref(maybe, &FieldSignature::unknown("x"), scope), None);
    assert!(state.diagnostics().is_empty());
}

#[test]
fn test_union_receiver_skips_null_and_undefined() {
    let mut scene = Scene::new();
    let (method, scope) = method_scope(&mut scene);
    let file = scene.class(scope.class).unwrap().declaring_file;
    let bar = scene.add_class(DeclOwner::File(file), ClassDecl::new("Bar"));
    scene.add_field(bar, FieldDecl::new("x", Type::Number));
    let bar_sig = scene.class(bar).unwrap().signature.clone();
    let b = scene.add_local(
        method,
        "b",
        Type::union([Type::Null, Type::Undefined, Type::class(bar_sig.clone())]),
    );

    let mut state = InferenceState::with_defaults(&scene);
    let Some(Ref::InstanceField { base, field }) =
        state.infer_field_ref(b, &FieldSignature::unknown("x"), scope)
    else {
        panic!("expected an instance field reference");
    };
    assert_eq!(base, b);
    assert_eq!(field.declaring, BaseSignature::Class(bar_sig));
    assert_eq!(field.ty, Type::Number);
}
