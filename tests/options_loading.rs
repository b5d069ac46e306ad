//! Integration tests for reading `ConversionOptions` from disk.

use std::io::Write;

use vbcs::{ConversionOptions, load_options, parse_options};

fn options_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write options");
    file
}

#[test]
fn test_load_full_options_file() {
    let file = options_file(
        r#"{
            "optionCompareText": true,
            "optionStrict": true,
            "optionInfer": false,
            "rootNamespace": "Acme.App",
            "qualifyModuleMembers": false,
            "emitRuntimeConversions": false
        }"#,
    );

    let options = load_options(file.path()).expect("loads");
    assert_eq!(
        options,
        ConversionOptions {
            option_compare_text: true,
            option_strict: true,
            option_infer: false,
            root_namespace: Some("Acme.App".to_string()),
            qualify_module_members: false,
            emit_runtime_conversions: false,
        }
    );
}

#[test]
fn test_missing_keys_keep_defaults() {
    let file = options_file(r#"{ "optionStrict": true }"#);

    let options = load_options(file.path()).expect("loads");
    assert!(options.option_strict);
    assert!(options.option_infer);
    assert!(options.qualify_module_members);
    assert!(options.emit_runtime_conversions);
    assert_eq!(options.root_namespace, None);
}

#[test]
fn test_empty_object_is_the_default() {
    assert_eq!(parse_options("{}").expect("parses"), ConversionOptions::default());
}

#[test]
fn test_missing_file_names_the_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("vbcs.json");

    let error = load_options(&path).expect_err("file does not exist");
    let message = format!("{error:#}");
    assert!(message.contains("failed to read options file"), "{message}");
    assert!(message.contains("vbcs.json"), "{message}");
}

#[test]
fn test_malformed_json_is_reported_with_the_path() {
    let file = options_file(r#"{ "optionStrict": "#);

    let error = load_options(file.path()).expect_err("malformed");
    assert!(error.to_string().starts_with("invalid options file"), "{error}");
}

#[test]
fn test_wrong_value_type_is_rejected() {
    assert!(parse_options(r#"{ "optionStrict": "yes" }"#).is_err());
}
