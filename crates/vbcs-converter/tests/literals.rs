use super::*;
use vbcs_syntax::value::{DateValue, DecimalValue};

fn render(value: ConstValue, text: &str) -> CsNode {
    let mut imports = IndexSet::new();
    render_literal(&value, Some(text), &mut imports)
}

fn numeric_text(value: ConstValue, text: &str) -> String {
    match render(value, text) {
        CsNode::NumericLiteral(text) => text,
        other => panic!("expected a numeric literal, got {other:?}"),
    }
}

#[test]
fn test_type_characters_map_to_target_suffixes() {
    assert_eq!(numeric_text(ConstValue::Int16(5), "5S"), "5");
    assert_eq!(numeric_text(ConstValue::UInt32(5), "5UI"), "5U");
    assert_eq!(numeric_text(ConstValue::UInt64(5), "5ul"), "5UL");
    assert_eq!(numeric_text(ConstValue::Int64(5), "5&"), "5L");
    assert_eq!(
        numeric_text(ConstValue::Decimal(DecimalValue::from_integer(10)), "10D"),
        "10M"
    );
    assert_eq!(numeric_text(ConstValue::Decimal(DecimalValue::from_integer(10)), "10@"), "10M");
    assert_eq!(numeric_text(ConstValue::Single(1.5), "1.5!"), "1.5F");
    assert_eq!(numeric_text(ConstValue::Double(2.0), "2R"), "2D");
    assert_eq!(numeric_text(ConstValue::Int32(7), "7%"), "7");
}

#[test]
fn test_floating_values_keep_a_decimal_point() {
    assert_eq!(numeric_text(ConstValue::Double(3.0), "3"), "3.0");
    assert_eq!(numeric_text(ConstValue::Double(1e10), "1E10"), "1E10");
    assert_eq!(render_numeric_value(&ConstValue::Double(100.0)), "100.0");
    assert_eq!(render_numeric_value(&ConstValue::Single(0.5)), "0.5F");
    assert_eq!(render_numeric_value(&ConstValue::Double(f64::NAN)), "double.NaN");
}

#[test]
fn test_based_literals() {
    assert_eq!(numeric_text(ConstValue::Int32(255), "&HFF"), "0xFF");
    assert_eq!(numeric_text(ConstValue::Int64(255), "&HFFL"), "0xFFL");
    assert_eq!(numeric_text(ConstValue::Int32(5), "&B101"), "0b101");
    // Octal and values that wrapped negative fall back to decimal.
    assert_eq!(numeric_text(ConstValue::Int32(8), "&O10"), "8");
    assert_eq!(numeric_text(ConstValue::Int32(-1), "&HFFFFFFFF"), "-1");
}

#[test]
fn test_values_without_text_render_from_the_value() {
    assert_eq!(render_numeric(&ConstValue::UInt64(42), None), "42UL");
    assert_eq!(render_numeric(&ConstValue::Int32(-3), None), "-3");
    assert_eq!(
        render_numeric(
            &ConstValue::Decimal(DecimalValue {
                mantissa: 125,
                scale: 2
            }),
            None
        ),
        "1.25M"
    );
}

#[test]
fn test_strings_choose_verbatim_for_paths_and_line_breaks() {
    assert_eq!(
        render(ConstValue::String("C:\\temp".to_string()), "\"C:\\temp\""),
        CsNode::StringLiteral {
            value: "C:\\temp".to_string(),
            verbatim: true
        }
    );
    assert_eq!(
        render_string("line1\r\nline2", None),
        CsNode::StringLiteral {
            value: "line1\r\nline2".to_string(),
            verbatim: true
        }
    );
    assert_eq!(render_string("plain", None), CsNode::string("plain"));
    // A tab cannot be written inside a verbatim literal.
    assert_eq!(render_string("a\\b\tc", None), CsNode::string("a\\b\tc"));
}

#[test]
fn test_doubled_quotes_reuse_the_source_spelling() {
    let node = render(ConstValue::String("say \"hi\"".to_string()), "\"say \"\"hi\"\"\"");
    assert_eq!(
        node,
        CsNode::StringLiteral {
            value: "say \"hi\"".to_string(),
            verbatim: true
        }
    );
}

#[test]
fn test_dates_parse_at_runtime_and_import_system() {
    let mut imports = IndexSet::new();
    let date = ConstValue::Date(DateValue::date(2024, 2, 29));
    let node = render_literal(&date, None, &mut imports);
    assert_eq!(
        node,
        CsNode::static_call(
            "DateTime",
            "Parse",
            vec![CsNode::string("2024-02-29 00:00:00")]
        )
    );
    assert!(imports.contains(SYSTEM_NAMESPACE));
}

#[test]
fn test_other_literals() {
    assert_eq!(render(ConstValue::Boolean(true), "True"), CsNode::BooleanLiteral(true));
    assert_eq!(render(ConstValue::Char('x'), "\"x\"c"), CsNode::CharLiteral('x'));
    assert_eq!(render(ConstValue::Nothing, "Nothing"), CsNode::NullLiteral);
}
