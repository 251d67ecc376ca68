//! Call target resolution through whole-scene inference.

use arkinfer_checker::{InferenceOptions, infer_scene};
use arkinfer_common::diagnostics::diagnostic_codes;
use arkinfer_ir::model::{
    ClassDecl, DeclOwner, ExportDecl, Expr, FileId, ImportDecl, InvokeExpr, LocalId, MethodDecl,
    MethodId, Scene, StmtKind, Value,
};
use arkinfer_ir::{MethodParameter, MethodSignature, Type};

fn user_method(scene: &mut Scene, file: FileId) -> MethodId {
    let main = scene.add_class(DeclOwner::File(file), ClassDecl::new("Main"));
    scene.add_method(main, MethodDecl::new("run").implement(Vec::new(), Type::Void))
}

/// `target = invoke`
fn assign_call(scene: &mut Scene, method: MethodId, target: LocalId, invoke: InvokeExpr) {
    scene.push_stmt(
        method,
        StmtKind::Assign {
            left: Value::Local(target),
            right: Value::Expr(Box::new(Expr::Invoke(invoke))),
        },
    );
}

/// The invoke expressions of `method`'s body, in order.
fn calls(scene: &Scene, method: MethodId) -> Vec<InvokeExpr> {
    let body = scene.method(method).unwrap().body().unwrap();
    body.cfg
        .blocks
        .iter()
        .flat_map(|block| (0..block.len()).filter_map(|i| block.stmt(i)).collect::<Vec<_>>())
        .filter_map(|stmt| stmt.invoke_expr().cloned())
        .collect()
}

fn local_type(scene: &Scene, local: LocalId) -> Type {
    scene.local(local).unwrap().ty().clone()
}

#[test]
fn test_method_call_types_assigned_local() {
    let mut scene = Scene::new();
    let app = scene.add_file("app", "entry/app.ets");
    let greeter = scene.add_class(DeclOwner::File(app), ClassDecl::new("Greeter"));
    scene.add_method(greeter, MethodDecl::new("greet").implement(Vec::new(), Type::String));
    let greeter_sig = scene.class(greeter).unwrap().signature.clone();

    let run = user_method(&mut scene, app);
    let g = scene.add_local(run, "g", Type::class(greeter_sig.clone()));
    let text = scene.add_local(run, "text", Type::Unknown);
    assign_call(&mut scene, run, text, InvokeExpr::instance(g, MethodSignature::unknown("greet"), Vec::new()));

    let report = infer_scene(&mut scene, &InferenceOptions::default());
    assert!(report.diagnostics.is_empty(), "unexpected: {:?}", report.diagnostics);
    assert_eq!(local_type(&scene, text), Type::String);
    let bound = &calls(&scene, run)[0];
    assert_eq!(bound.method_signature.declaring_class, greeter_sig);
}

#[test]
fn test_imported_function_call() {
    let mut scene = Scene::new();
    let util = scene.add_file("app", "entry/util.ets");
    let util_default = scene.file(util).unwrap().default_class;
    let format = scene.add_method(
        util_default,
        MethodDecl::new("format").implement(vec![MethodParameter::new("n", Type::Number)], Type::String),
    );
    scene.add_export(DeclOwner::File(util), ExportDecl::new("format"));

    let app = scene.add_file("app", "entry/app.ets");
    scene.add_import(app, ImportDecl::named("format", "./util"));
    let run = user_method(&mut scene, app);
    let out = scene.add_local(run, "out", Type::Unknown);
    assign_call(
        &mut scene,
        run,
        out,
        InvokeExpr::static_call(
            MethodSignature::unknown("format"),
            vec![Value::Constant(arkinfer_ir::model::Constant::number("3"))],
        ),
    );

    infer_scene(&mut scene, &InferenceOptions::default());
    let expected = scene.method(format).unwrap().signature().unwrap();
    assert_eq!(calls(&scene, run)[0].method_signature, expected);
    assert_eq!(local_type(&scene, out), Type::String);
}

#[test]
fn test_sdk_global_function_call() {
    let mut scene = Scene::new();
    let sdk = scene.add_sdk_file("sdk", "api/global.d.ts");
    let sdk_default = scene.file(sdk).unwrap().default_class;
    scene.add_method(
        sdk_default,
        MethodDecl::new("setTimeout").declare(
            vec![MethodParameter::new("delay", Type::Number)],
            Type::Number,
        ),
    );

    let app = scene.add_file("app", "entry/app.ets");
    let run = user_method(&mut scene, app);
    let handle = scene.add_local(run, "handle", Type::Unknown);
    assign_call(
        &mut scene,
        run,
        handle,
        InvokeExpr::static_call(MethodSignature::unknown("setTimeout"), Vec::new()),
    );

    infer_scene(&mut scene, &InferenceOptions::default());
    assert_eq!(local_type(&scene, handle), Type::Number);
}

#[test]
fn test_chained_calls_resolve_across_passes() {
    let mut scene = Scene::new();
    let app = scene.add_file("app", "entry/app.ets");
    let builder = scene.add_class(DeclOwner::File(app), ClassDecl::new("Builder"));
    let builder_sig = scene.class(builder).unwrap().signature.clone();
    scene.add_method(
        builder,
        MethodDecl::new("width").implement(Vec::new(), Type::class(builder_sig.clone())),
    );
    scene.add_method(builder, MethodDecl::new("build").implement(Vec::new(), Type::Boolean));

    let run = user_method(&mut scene, app);
    let b = scene.add_local(run, "b", Type::class(builder_sig));
    let tmp = scene.add_local(run, "%0", Type::Unknown);
    let done = scene.add_local(run, "done", Type::Unknown);
    assign_call(&mut scene, run, tmp, InvokeExpr::instance(b, MethodSignature::unknown("width"), Vec::new()));
    assign_call(&mut scene, run, done, InvokeExpr::instance(tmp, MethodSignature::unknown("build"), Vec::new()));

    let report = infer_scene(&mut scene, &InferenceOptions::default());
    assert_eq!(local_type(&scene, done), Type::Boolean);
    assert!(report.diagnostics.is_empty(), "unexpected: {:?}", report.diagnostics);
}

#[test]
fn test_unresolved_method_reported_once_across_passes() {
    let mut scene = Scene::new();
    let app = scene.add_file("app", "entry/app.ets");
    let point = scene.add_class(DeclOwner::File(app), ClassDecl::new("Point"));
    let point_sig = scene.class(point).unwrap().signature.clone();
    let run = user_method(&mut scene, app);
    let p = scene.add_local(run, "p", Type::class(point_sig));
    scene.push_stmt(
        run,
        StmtKind::Invoke(InvokeExpr::instance(p, MethodSignature::unknown("draw"), Vec::new())),
    );

    let options = InferenceOptions {
        max_passes: 4,
        ..InferenceOptions::default()
    };
    let report = infer_scene(&mut scene, &options);
    let codes: Vec<u32> = report.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![diagnostic_codes::UNRESOLVED_INVOKE]);
    assert_eq!(report.diagnostics[0].file, "entry/app.ets");
}
