//! Literal translation.
//!
//! Source literals arrive as a value plus the token text the front-end saw.
//! Numeric text is reused where the target grammar accepts it, with
//! type-character suffixes and base prefixes remapped through a fixed table;
//! anything the target cannot spell the same way is rendered from the value.

use indexmap::IndexSet;
use vbcs_syntax::target::CsNode;
use vbcs_syntax::value::ConstValue;

/// Namespace imported when a literal needs `DateTime`.
pub const SYSTEM_NAMESPACE: &str = "System";

/// Source type characters and the target suffix of the same type. Longer
/// suffixes come first so `UL` is not read as `L`.
const SUFFIXES: [(&str, &str); 14] = [
    ("US", ""),
    ("UI", "U"),
    ("UL", "UL"),
    ("S", ""),
    ("I", ""),
    ("L", "L"),
    ("D", "M"),
    ("F", "F"),
    ("R", "D"),
    ("%", ""),
    ("&", "L"),
    ("@", "M"),
    ("!", "F"),
    ("#", "D"),
];

/// Suffixes valid on `&H`/`&O`/`&B` literals (`D` and `F` are hex digits there).
const INTEGRAL_SUFFIXES: [&str; 8] = ["US", "UI", "UL", "S", "I", "L", "%", "&"];

/// Render a literal value, reusing `original_text` when the target accepts it.
pub fn render_literal(
    value: &ConstValue,
    original_text: Option<&str>,
    imports: &mut IndexSet<String>,
) -> CsNode {
    match value {
        ConstValue::Nothing => CsNode::NullLiteral,
        ConstValue::Boolean(b) => CsNode::BooleanLiteral(*b),
        ConstValue::Char(c) => CsNode::CharLiteral(*c),
        ConstValue::String(s) => render_string(s, original_text),
        ConstValue::Date(date) => {
            imports.insert(SYSTEM_NAMESPACE.to_string());
            let text = format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                date.year, date.month, date.day, date.hour, date.minute, date.second
            );
            CsNode::static_call("DateTime", "Parse", vec![CsNode::string(text)])
        }
        numeric => CsNode::NumericLiteral(render_numeric(numeric, original_text)),
    }
}

// =============================================================================
// Numbers
// =============================================================================

/// Numeric literal text for `value`.
pub fn render_numeric(value: &ConstValue, original_text: Option<&str>) -> String {
    original_text
        .and_then(|text| translate_numeric_text(text, value))
        .unwrap_or_else(|| render_numeric_value(value))
}

fn integral_suffix(value: &ConstValue) -> &'static str {
    match value {
        ConstValue::UInt32(_) => "U",
        ConstValue::Int64(_) => "L",
        ConstValue::UInt64(_) => "UL",
        _ => "",
    }
}

/// Split a known suffix off `text`, comparing case-insensitively.
fn split_suffix<'t>(text: &'t str, suffixes: &[&str]) -> (&'t str, Option<&'static str>) {
    let upper = text.to_ascii_uppercase();
    for (vb, cs) in SUFFIXES {
        if suffixes.contains(&vb) && upper.ends_with(vb) {
            return (&text[..text.len() - vb.len()], Some(cs));
        }
    }
    (text, None)
}

fn translate_numeric_text(text: &str, value: &ConstValue) -> Option<String> {
    let text = text.trim();
    if let Some(based) = text.strip_prefix('&') {
        let mut chars = based.chars();
        let prefix = match chars.next()?.to_ascii_uppercase() {
            'H' => "0x",
            'B' => "0b",
            // Octal has no target spelling.
            _ => return None,
        };
        // Values that wrapped negative read differently in the target.
        if value.as_i128().is_none_or(|v| v < 0) {
            return None;
        }
        let (digits, _) = split_suffix(chars.as_str(), &INTEGRAL_SUFFIXES);
        if digits.is_empty() {
            return None;
        }
        return Some(format!("{prefix}{digits}{}", integral_suffix(value)));
    }

    let all: Vec<&str> = SUFFIXES.iter().map(|(vb, _)| *vb).collect();
    let (body, suffix) = split_suffix(text, &all);
    let starts_numeric = body
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.');
    if !starts_numeric {
        return None;
    }
    let mut rendered = body.to_string();
    match suffix {
        Some(cs) => rendered.push_str(cs),
        None if value.is_floating() && !body.contains(['.', 'e', 'E']) => rendered.push_str(".0"),
        None if matches!(value, ConstValue::Decimal(_)) => rendered.push('M'),
        None => rendered.push_str(integral_suffix(value)),
    }
    Some(rendered)
}

/// Numeric literal text built from the value alone.
pub fn render_numeric_value(value: &ConstValue) -> String {
    match value {
        ConstValue::Single(v) => {
            if v.is_nan() {
                "float.NaN".to_string()
            } else if v.is_infinite() {
                let sign = if *v > 0.0 { "Positive" } else { "Negative" };
                format!("float.{sign}Infinity")
            } else {
                format!("{v:?}F")
            }
        }
        ConstValue::Double(v) => {
            if v.is_nan() {
                "double.NaN".to_string()
            } else if v.is_infinite() {
                let sign = if *v > 0.0 { "Positive" } else { "Negative" };
                format!("double.{sign}Infinity")
            } else {
                // Debug keeps a decimal point or an exponent: `2.0`, `1e300`.
                format!("{v:?}")
            }
        }
        ConstValue::Decimal(d) => format!("{d}M"),
        ConstValue::Boolean(b) => b.to_string(),
        other => match other.as_i128() {
            Some(v) => format!("{v}{}", integral_suffix(other)),
            None => "0".to_string(),
        },
    }
}

// =============================================================================
// Strings
// =============================================================================

/// Whether `text` is a quoted source string whose doubled quotes decode to
/// exactly `value`.
fn original_is_verbatim_form(text: &str, value: &str) -> bool {
    let Some(inner) = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return false;
    };
    inner.replace("\"\"", "\"") == value
}

/// String literal: verbatim when the value has backslashes or line breaks
/// (or quotes the source already wrote doubled) and no other control
/// characters, regular escaped form otherwise.
pub fn render_string(value: &str, original_text: Option<&str>) -> CsNode {
    let other_control = value
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\r');
    let wants_verbatim = value.contains(['\\', '\n', '\r'])
        || (value.contains('"') && original_text.is_some_and(|t| original_is_verbatim_form(t, value)));
    CsNode::StringLiteral {
        value: value.to_string(),
        verbatim: wants_verbatim && !other_control,
    }
}

#[cfg(test)]
#[path = "../tests/literals.rs"]
mod tests;
