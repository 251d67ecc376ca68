use super::*;

#[test]
fn test_empty_json_gives_defaults() {
    let options = InferenceOptions::from_json("{}").unwrap();
    assert_eq!(options, InferenceOptions::default());
    assert_eq!(options.max_passes, 2);
    assert!(options.infer_return_types_from_body);
}

#[test]
fn test_camel_case_fields() {
    let options = InferenceOptions::from_json(
        r#"{"maxPasses": 5, "declarationTextHeuristic": false, "sdkGlobalFolders": ["component"]}"#,
    )
    .unwrap();
    assert_eq!(options.max_passes, 5);
    assert!(!options.declaration_text_heuristic);
    assert!(options.infer_return_types_from_body);
    assert_eq!(options.sdk_global_folders, vec!["component".to_string()]);
}

#[test]
fn test_malformed_json_is_an_error() {
    assert!(InferenceOptions::from_json(r#"{"maxPasses": "many"}"#).is_err());
}

#[test]
fn test_global_sdk_folders() {
    let all = InferenceOptions::default();
    assert!(all.is_global_sdk_file("api/@ohos.router.d.ts"));

    let only_components = InferenceOptions {
        sdk_global_folders: vec!["component".to_string()],
        ..InferenceOptions::default()
    };
    assert!(only_components.is_global_sdk_file("component/button.d.ts"));
    assert!(only_components.is_global_sdk_file("ets/component/button.d.ts"));
    assert!(!only_components.is_global_sdk_file("api/@ohos.router.d.ts"));
}
