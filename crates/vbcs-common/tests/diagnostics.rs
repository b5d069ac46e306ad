use super::*;

#[test]
fn test_format_message_replaces_placeholders() {
    let text = format_message(
        diagnostic_codes::UNSUPPORTED_CONSTRUCT_TEMPLATE,
        &["OnErrorGoTo", "no conversion rule"],
    );
    assert_eq!(text, "Cannot convert OnErrorGoTo: no conversion rule");
}

#[test]
fn test_diagnostic_serializes_without_member() {
    let diag = Diagnostic::error(4, 10, "boom".to_string(), diagnostic_codes::MISSING_SYMBOL);
    let json = serde_json::to_value(&diag).expect("diagnostic serializes");
    assert_eq!(json["code"], 1005);
    assert_eq!(json["category"], "Error");
    assert!(json.get("member").is_none());
    assert!(diag.is_error());
}

#[test]
fn test_warning_with_member() {
    let diag = Diagnostic::warning(0, 1, "folded".to_string(), 1002).with_member("Module1.Main");
    assert!(!diag.is_error());
    assert_eq!(diag.member.as_deref(), Some("Module1.Main"));
}
