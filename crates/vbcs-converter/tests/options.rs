use super::*;

#[test]
fn test_defaults_round_trip_through_camel_case_json() {
    let json = r#"{ "optionCompareText": true, "rootNamespace": "App" }"#;
    let options: ConversionOptions = serde_json::from_str(json).expect("valid options");
    assert!(options.option_compare_text);
    assert_eq!(options.root_namespace.as_deref(), Some("App"));
    // Unlisted keys keep their defaults.
    assert!(options.option_infer);
    assert!(options.emit_runtime_conversions);

    let written = serde_json::to_value(&options).expect("serializes");
    assert_eq!(written["qualifyModuleMembers"], true);
}

#[test]
fn test_unit_options_override_file_defaults() {
    let defaults = ConversionOptions::default();
    let unit = defaults.with_unit_options(&[
        OptionStatement::CompareText(true),
        OptionStatement::Strict(true),
        OptionStatement::Infer(false),
    ]);
    assert!(unit.option_compare_text);
    assert!(unit.option_strict);
    assert!(!unit.option_infer);
    assert!(!defaults.option_compare_text);
}

#[test]
fn test_cancellation_is_shared_between_clones() {
    let flag = CancellationFlag::new();
    let observer = flag.clone();
    assert!(!observer.is_cancelled());
    flag.cancel();
    assert!(observer.is_cancelled());
}
