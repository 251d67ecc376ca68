//! Whole-scene driver: pass scheduling, convergence and the report.

use arkinfer_checker::{InferenceOptions, SceneInferenceReport, infer_scene};
use arkinfer_common::diagnostics::diagnostic_codes;
use arkinfer_common::tracing_config::init_tracing;
use arkinfer_ir::model::{
    ClassDecl, Constant, DeclOwner, Expr, InvokeExpr, MethodDecl, Modifiers, Scene, StmtKind, Value,
};
use arkinfer_ir::{ClassSignature, MethodSignature, MethodSubSignature, Type};

#[test]
fn test_empty_scene_converges_in_one_pass() {
    init_tracing();
    let mut scene = Scene::new();
    let report = infer_scene(&mut scene, &InferenceOptions::default());
    assert_eq!(report.passes, 1);
    assert!(report.converged);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_max_passes_clamped_to_at_least_one() {
    init_tracing();
    let mut scene = Scene::new();
    let app = scene.add_file("app", "entry/app.ets");
    let main = scene.add_class(DeclOwner::File(app), ClassDecl::new("Main"));
    let run = scene.add_method(main, MethodDecl::new("run").implement(Vec::new(), Type::Void));
    let x = scene.add_local(run, "x", Type::Unknown);
    scene.push_stmt(
        run,
        StmtKind::Assign {
            left: Value::Local(x),
            right: Value::Constant(Constant::number("1")),
        },
    );

    let options = InferenceOptions {
        max_passes: 0,
        ..InferenceOptions::default()
    };
    let report = infer_scene(&mut scene, &options);
    assert_eq!(report.passes, 1);
    assert!(!report.converged);
    assert_eq!(*scene.local(x).unwrap().ty(), Type::Number);
}

#[test]
fn test_sdk_files_inferred_before_user_files() {
    init_tracing();
    let mut scene = Scene::new();
    // The user file is added first but reads a type the SDK file infers.
    let app = scene.add_file("app", "entry/app.ets");
    let sdk = scene.add_sdk_file("sdk", "api/config.d.ts");
    let config = scene.add_class(DeclOwner::File(sdk), ClassDecl::new("Config"));
    let load = scene.add_method(
        config,
        MethodDecl::new("load")
            .with_modifiers(Modifiers::STATIC)
            .implement(Vec::new(), Type::Unknown),
    );
    scene.push_stmt(load, StmtKind::Return(Value::Constant(Constant::string("'x'"))));

    let main = scene.add_class(DeclOwner::File(app), ClassDecl::new("Main"));
    let run = scene.add_method(main, MethodDecl::new("run").implement(Vec::new(), Type::Void));
    let value = scene.add_local(run, "value", Type::Unknown);
    let call = InvokeExpr::static_call(
        MethodSignature::new(
            ClassSignature::unknown("Config"),
            MethodSubSignature::new("load", Vec::new(), Type::Unknown),
        ),
        Vec::new(),
    );
    scene.push_stmt(
        run,
        StmtKind::Assign {
            left: Value::Local(value),
            right: Value::Expr(Box::new(Expr::Invoke(call))),
        },
    );

    let options = InferenceOptions {
        max_passes: 1,
        ..InferenceOptions::default()
    };
    infer_scene(&mut scene, &options);
    assert_eq!(*scene.local(value).unwrap().ty(), Type::String);
}

#[test]
fn test_report_serializes_to_camel_case_json() {
    init_tracing();
    let mut scene = Scene::new();
    let app = scene.add_file("app", "entry/app.ets");
    let point = scene.add_class(DeclOwner::File(app), ClassDecl::new("Point"));
    let point_sig = scene.class(point).unwrap().signature.clone();
    let main = scene.add_class(DeclOwner::File(app), ClassDecl::new("Main"));
    let run = scene.add_method(main, MethodDecl::new("run").implement(Vec::new(), Type::Void));
    let p = scene.add_local(run, "p", Type::class(point_sig));
    scene.push_stmt(
        run,
        StmtKind::Invoke(InvokeExpr::instance(p, MethodSignature::unknown("draw"), Vec::new())),
    );

    let report: SceneInferenceReport = infer_scene(&mut scene, &InferenceOptions::default());
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["passes"], report.passes);
    assert_eq!(json["converged"], report.converged);
    let diagnostics = json["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["code"], diagnostic_codes::UNRESOLVED_INVOKE);
    assert_eq!(diagnostics[0]["file"], "entry/app.ets");
}

#[test]
fn test_options_from_json_drive_the_run() {
    init_tracing();
    let options = InferenceOptions::from_json(r#"{ "maxPasses": 3, "inferReturnTypesFromBody": false }"#).unwrap();
    let mut scene = Scene::new();
    let app = scene.add_file("app", "entry/app.ets");
    let main = scene.add_class(DeclOwner::File(app), ClassDecl::new("Main"));
    let size = scene.add_method(main, MethodDecl::new("size").implement(Vec::new(), Type::Unknown));
    scene.push_stmt(size, StmtKind::Return(Value::Constant(Constant::number("1"))));

    let report = infer_scene(&mut scene, &options);
    assert!(report.converged);
    let signature = scene.method(size).unwrap().implementation_signature().unwrap();
    assert_eq!(signature.sub.return_type, Type::Unknown);
}

#[test]
fn test_reassigned_union_local_converges() {
    init_tracing();
    let mut scene = Scene::new();
    let app = scene.add_file("app", "entry/app.ets");
    let main = scene.add_class(DeclOwner::File(app), ClassDecl::new("Main"));
    let run = scene.add_method(main, MethodDecl::new("run").implement(Vec::new(), Type::Void));
    let v = scene.add_local(run, "v", Type::union([Type::Number, Type::String]));
    for value in [Constant::string("'a'"), Constant::number("1")] {
        scene.push_stmt(
            run,
            StmtKind::Assign {
                left: Value::Local(v),
                right: Value::Constant(value),
            },
        );
    }

    let options = InferenceOptions {
        max_passes: 6,
        ..InferenceOptions::default()
    };
    let report = infer_scene(&mut scene, &options);
    assert!(report.converged);
    assert!(report.passes < options.max_passes);
}
