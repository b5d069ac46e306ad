//! Compile-time evaluation of constant expressions.
//!
//! The semantic model's constant annotation is authoritative when present.
//! Otherwise the folder evaluates literals, operators and the conversion
//! intrinsics itself, following source-dialect semantics: operand types meet
//! on the source widening lattice, integral overflow is an error, `/` is
//! always floating, `\` truncates, float-to-integral conversion rounds half
//! to even and `True` converts to `-1`.
//!
//! Every failure is a `ConversionError::ConstantEvaluation`; the caller emits
//! the expression unfolded and attaches a warning.

use crate::error::{ConversionError, ConvertResult};
use std::cmp::Ordering;
use tracing::trace;
use vbcs_common::limits::MAX_CONSTANT_FOLD_DEPTH;
use vbcs_semantic::conversions::{source_binary_result, source_numeric_common};
use vbcs_semantic::{SemanticModel, SpecialType};
use vbcs_syntax::source::{BinaryOp, CastKind, NodeIndex, PredefinedCast, SourceArena, SourceKind, UnaryOp};
use vbcs_syntax::value::{ConstValue, DateValue, DecimalValue};

fn fold_error(message: impl Into<String>) -> ConversionError {
    ConversionError::constant(message)
}

/// Special type a conversion intrinsic produces.
pub const fn predefined_cast_type(keyword: PredefinedCast) -> SpecialType {
    match keyword {
        PredefinedCast::CBool => SpecialType::Boolean,
        PredefinedCast::CByte => SpecialType::Byte,
        PredefinedCast::CSByte => SpecialType::SByte,
        PredefinedCast::CShort => SpecialType::Int16,
        PredefinedCast::CUShort => SpecialType::UInt16,
        PredefinedCast::CInt => SpecialType::Int32,
        PredefinedCast::CUInt => SpecialType::UInt32,
        PredefinedCast::CLng => SpecialType::Int64,
        PredefinedCast::CULng => SpecialType::UInt64,
        PredefinedCast::CSng => SpecialType::Single,
        PredefinedCast::CDbl => SpecialType::Double,
        PredefinedCast::CDec => SpecialType::Decimal,
        PredefinedCast::CChar => SpecialType::Char,
        PredefinedCast::CStr => SpecialType::String,
        PredefinedCast::CDate => SpecialType::DateTime,
        PredefinedCast::CObj => SpecialType::Object,
    }
}

pub struct ConstantFolder<'a> {
    arena: &'a SourceArena,
    model: &'a dyn SemanticModel,
    compare_text: bool,
}

impl<'a> ConstantFolder<'a> {
    pub fn new(arena: &'a SourceArena, model: &'a dyn SemanticModel, compare_text: bool) -> Self {
        Self {
            arena,
            model,
            compare_text,
        }
    }

    /// Evaluate `node` to a constant.
    pub fn fold(&self, node: NodeIndex) -> ConvertResult<ConstValue> {
        let value = self.fold_at(node, 0)?;
        trace!(node = node.0, ?value, "folded constant");
        Ok(value)
    }

    /// Evaluate `node` and convert the result to `to`.
    pub fn fold_to(&self, node: NodeIndex, to: SpecialType) -> ConvertResult<ConstValue> {
        convert_value(&self.fold(node)?, to)
    }

    fn fold_at(&self, node: NodeIndex, depth: u32) -> ConvertResult<ConstValue> {
        if depth > MAX_CONSTANT_FOLD_DEPTH {
            return Err(fold_error("expression nests too deeply"));
        }
        if let Some(value) = self.model.constant_value(node) {
            return Ok(value);
        }
        let Some(kind) = self.arena.kind(node) else {
            return Err(fold_error("expression is missing"));
        };
        match kind {
            SourceKind::Literal { value, .. } => Ok(value.clone()),
            SourceKind::Parenthesized { expression } => self.fold_at(*expression, depth + 1),
            SourceKind::Unary { op, operand } => fold_unary(*op, self.fold_at(*operand, depth + 1)?),
            SourceKind::Binary { op, left, right } => {
                let left = self.fold_at(*left, depth + 1)?;
                let right = self.fold_at(*right, depth + 1)?;
                fold_binary(*op, left, right, self.compare_text)
            }
            SourceKind::PredefinedCast { keyword, expression } => {
                convert_value(&self.fold_at(*expression, depth + 1)?, predefined_cast_type(*keyword))
            }
            SourceKind::Invocation {
                expression,
                arguments,
            } => {
                let keyword = self
                    .arena
                    .identifier_text(*expression)
                    .and_then(PredefinedCast::from_name);
                match (keyword, arguments.as_slice()) {
                    (Some(keyword), [argument]) if argument.name.is_none() => {
                        let Some(operand) = argument.expression else {
                            return Err(fold_error("conversion has no operand"));
                        };
                        convert_value(&self.fold_at(operand, depth + 1)?, predefined_cast_type(keyword))
                    }
                    _ => Err(fold_error("invocation is not a constant expression")),
                }
            }
            SourceKind::Cast {
                kind: CastKind::CType | CastKind::DirectCast,
                expression,
                type_ref,
            } if !type_ref.is_array() && !type_ref.nullable => {
                let Some(to) = SpecialType::from_vb_name(&type_ref.name) else {
                    return Err(fold_error(format!("{} is not a primitive type", type_ref.name)));
                };
                convert_value(&self.fold_at(*expression, depth + 1)?, to)
            }
            other => Err(fold_error(format!("{} is not a constant expression", other.name()))),
        }
    }
}

// =============================================================================
// Value Conversion
// =============================================================================

fn special_of(value: &ConstValue) -> ConvertResult<SpecialType> {
    SpecialType::of_value(value).ok_or_else(|| fold_error("Nothing has no type here"))
}

/// Build an integral value of type `to`, failing when `v` is out of range.
fn make_integral(v: i128, to: SpecialType) -> ConvertResult<ConstValue> {
    let Some((lo, hi)) = to.integral_range() else {
        return Err(fold_error(format!("{} is not integral", to.vb_keyword())));
    };
    if v < lo || v > hi {
        return Err(fold_error(format!("{v} overflows {}", to.vb_keyword())));
    }
    let value = match to {
        SpecialType::Byte => ConstValue::Byte(v as u8),
        SpecialType::SByte => ConstValue::SByte(v as i8),
        SpecialType::Int16 => ConstValue::Int16(v as i16),
        SpecialType::UInt16 => ConstValue::UInt16(v as u16),
        SpecialType::Int32 => ConstValue::Int32(v as i32),
        SpecialType::UInt32 => ConstValue::UInt32(v as u32),
        SpecialType::Int64 => ConstValue::Int64(v as i64),
        SpecialType::UInt64 => ConstValue::UInt64(v as u64),
        _ => return Err(fold_error(format!("{} is not integral", to.vb_keyword()))),
    };
    Ok(value)
}

/// Truncate `v` to the bit width of `t`, reinterpreting the sign bit for
/// signed types.
fn wrap_to(v: i128, t: SpecialType) -> i128 {
    let Some(width) = t.bit_width() else {
        return v;
    };
    let modulus = 1_i128 << width;
    let low = v & (modulus - 1);
    if !t.is_unsigned() && (low >> (width - 1)) & 1 == 1 {
        low - modulus
    } else {
        low
    }
}

/// Round a decimal to an integer, ties to even.
fn decimal_round(d: DecimalValue) -> ConvertResult<i128> {
    let factor = 10_i128
        .checked_pow(d.scale)
        .ok_or_else(|| fold_error("decimal scale out of range"))?;
    let quotient = d.mantissa / factor;
    let twice_remainder = (d.mantissa % factor).abs() * 2;
    let round_away = twice_remainder > factor || (twice_remainder == factor && quotient % 2 != 0);
    Ok(if round_away {
        quotient + d.mantissa.signum()
    } else {
        quotient
    })
}

fn parse_number(text: &str) -> ConvertResult<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| fold_error(format!("\"{text}\" is not a number")))
}

fn to_integer(value: &ConstValue) -> ConvertResult<i128> {
    match value {
        ConstValue::Nothing => Ok(0),
        ConstValue::Boolean(b) => Ok(if *b { -1 } else { 0 }),
        ConstValue::Single(_) | ConstValue::Double(_) | ConstValue::String(_) => {
            let f = to_f64(value)?;
            if !f.is_finite() {
                return Err(fold_error("non-finite value has no integral representation"));
            }
            Ok(f.round_ties_even() as i128)
        }
        ConstValue::Decimal(d) => decimal_round(*d),
        ConstValue::Char(_) | ConstValue::Date(_) => Err(fold_error(format!(
            "{} does not convert to a number",
            value_type_name(value)
        ))),
        integral => integral
            .as_i128()
            .ok_or_else(|| fold_error("value is not numeric")),
    }
}

fn to_f64(value: &ConstValue) -> ConvertResult<f64> {
    match value {
        ConstValue::Nothing => Ok(0.0),
        ConstValue::Boolean(b) => Ok(if *b { -1.0 } else { 0.0 }),
        ConstValue::String(s) => parse_number(s),
        other => other.as_f64().ok_or_else(|| {
            fold_error(format!("{} does not convert to a number", value_type_name(other)))
        }),
    }
}

fn to_decimal(value: &ConstValue) -> ConvertResult<DecimalValue> {
    match value {
        ConstValue::Decimal(d) => Ok(*d),
        ConstValue::Single(_) | ConstValue::Double(_) | ConstValue::String(_) => {
            let f = to_f64(value)?;
            DecimalValue::parse(&format!("{f}"))
                .ok_or_else(|| fold_error(format!("{f} overflows Decimal")))
        }
        other => Ok(DecimalValue::from_integer(to_integer(other)?)),
    }
}

fn to_bool(value: &ConstValue) -> ConvertResult<bool> {
    match value {
        ConstValue::Nothing => Ok(false),
        ConstValue::Boolean(b) => Ok(*b),
        ConstValue::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(true),
        ConstValue::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(false),
        other => Ok(to_f64(other)? != 0.0),
    }
}

fn value_type_name(value: &ConstValue) -> &'static str {
    SpecialType::of_value(value).map_or("Nothing", SpecialType::vb_keyword)
}

/// String form of a value, as `CStr` produces it.
pub fn format_value(value: &ConstValue) -> String {
    match value {
        ConstValue::Nothing => String::new(),
        ConstValue::Boolean(b) => if *b { "True" } else { "False" }.to_string(),
        ConstValue::Single(f) if f.is_nan() => "NaN".to_string(),
        ConstValue::Double(f) if f.is_nan() => "NaN".to_string(),
        ConstValue::Single(f) if f.is_infinite() => infinity_text(*f > 0.0),
        ConstValue::Double(f) if f.is_infinite() => infinity_text(*f > 0.0),
        ConstValue::Single(f) => f.to_string(),
        ConstValue::Double(f) => f.to_string(),
        ConstValue::Decimal(d) => d.to_string(),
        ConstValue::Char(c) => c.to_string(),
        ConstValue::String(s) => s.clone(),
        ConstValue::Date(d) => d.to_string(),
        integral => integral.as_i128().unwrap_or_default().to_string(),
    }
}

fn infinity_text(positive: bool) -> String {
    if positive { "Infinity" } else { "-Infinity" }.to_string()
}

/// Convert a constant to `to` with source-dialect conversion semantics.
pub fn convert_value(value: &ConstValue, to: SpecialType) -> ConvertResult<ConstValue> {
    match to {
        SpecialType::Object => Ok(value.clone()),
        SpecialType::String => Ok(ConstValue::String(format_value(value))),
        SpecialType::Boolean => Ok(ConstValue::Boolean(to_bool(value)?)),
        SpecialType::Char => match value {
            ConstValue::Char(c) => Ok(ConstValue::Char(*c)),
            ConstValue::Nothing => Ok(ConstValue::Char('\0')),
            ConstValue::String(s) => s
                .chars()
                .next()
                .map(ConstValue::Char)
                .ok_or_else(|| fold_error("empty string has no first character")),
            other => Err(fold_error(format!(
                "{} does not convert to Char",
                value_type_name(other)
            ))),
        },
        SpecialType::DateTime => match value {
            ConstValue::Date(d) => Ok(ConstValue::Date(*d)),
            ConstValue::Nothing => Ok(ConstValue::Date(DateValue::date(1, 1, 1))),
            other => Err(fold_error(format!(
                "{} does not convert to Date",
                value_type_name(other)
            ))),
        },
        SpecialType::Single => Ok(ConstValue::Single(to_f64(value)? as f32)),
        SpecialType::Double => Ok(ConstValue::Double(to_f64(value)?)),
        SpecialType::Decimal => Ok(ConstValue::Decimal(to_decimal(value)?)),
        SpecialType::Void => Err(fold_error("Void has no values")),
        integral => {
            // True is all bits set, which for unsigned types is the maximum.
            if matches!(value, ConstValue::Boolean(true))
                && integral.is_unsigned()
                && let Some((_, max)) = integral.integral_range()
            {
                return make_integral(max, integral);
            }
            make_integral(to_integer(value)?, integral)
        }
    }
}

/// Zero value of `special`, standing in for `Nothing` operands.
fn default_of(special: SpecialType) -> ConvertResult<ConstValue> {
    convert_value(&ConstValue::Nothing, special)
}

// =============================================================================
// Operators
// =============================================================================

fn fold_unary(op: UnaryOp, value: ConstValue) -> ConvertResult<ConstValue> {
    let value = match value {
        ConstValue::Nothing => ConstValue::Int32(0),
        other => other,
    };
    let operand_type = special_of(&value)?;
    match op {
        UnaryOp::Plus => match operand_type {
            SpecialType::Boolean => convert_value(&value, SpecialType::Int16),
            SpecialType::String => convert_value(&value, SpecialType::Double),
            t if t.is_numeric() => Ok(value),
            t => Err(fold_error(format!("unary + does not apply to {}", t.vb_keyword()))),
        },
        UnaryOp::Minus => {
            let result_type = match operand_type {
                SpecialType::Boolean | SpecialType::Byte => SpecialType::Int16,
                SpecialType::UInt16 => SpecialType::Int32,
                SpecialType::UInt32 => SpecialType::Int64,
                SpecialType::UInt64 => SpecialType::Decimal,
                SpecialType::String => SpecialType::Double,
                t if t.is_numeric() => t,
                t => return Err(fold_error(format!("unary - does not apply to {}", t.vb_keyword()))),
            };
            match convert_value(&value, result_type)? {
                ConstValue::Single(f) => Ok(ConstValue::Single(-f)),
                ConstValue::Double(f) => Ok(ConstValue::Double(-f)),
                ConstValue::Decimal(d) => Ok(ConstValue::Decimal(DecimalValue {
                    mantissa: -d.mantissa,
                    scale: d.scale,
                })),
                integral => make_integral(-to_integer(&integral)?, result_type),
            }
        }
        UnaryOp::Not => match value {
            ConstValue::Boolean(b) => Ok(ConstValue::Boolean(!b)),
            _ => {
                let target = if operand_type.is_integral() {
                    operand_type
                } else {
                    SpecialType::Int64
                };
                let v = to_integer(&convert_value(&value, target)?)?;
                make_integral(wrap_to(!v, target), target)
            }
        },
    }
}

fn fold_binary(
    op: BinaryOp,
    left: ConstValue,
    right: ConstValue,
    compare_text: bool,
) -> ConvertResult<ConstValue> {
    // Nothing takes the zero value of the other operand's type.
    let (left, right) = match (left, right) {
        (ConstValue::Nothing, ConstValue::Nothing) => (ConstValue::Int32(0), ConstValue::Int32(0)),
        (ConstValue::Nothing, other) => (default_of(special_of(&other)?)?, other),
        (other, ConstValue::Nothing) => {
            let zero = default_of(special_of(&other)?)?;
            (other, zero)
        }
        pair => pair,
    };
    let a = special_of(&left)?;
    let b = special_of(&right)?;
    match op {
        BinaryOp::Concatenate => Ok(ConstValue::String(format_value(&left) + &format_value(&right))),
        BinaryOp::Like | BinaryOp::Is | BinaryOp::IsNot => Err(fold_error(format!(
            "{} is evaluated at run time",
            op.text()
        ))),
        BinaryOp::AndAlso => Ok(ConstValue::Boolean(to_bool(&left)? && to_bool(&right)?)),
        BinaryOp::OrElse => Ok(ConstValue::Boolean(to_bool(&left)? || to_bool(&right)?)),
        op if op.is_comparison() => compare(op, &left, &right, a, b, compare_text).map(ConstValue::Boolean),
        op => {
            let Some(result) = source_binary_result(op, a, b) else {
                return Err(fold_error(format!(
                    "{} does not apply to {} and {}",
                    op.text(),
                    a.vb_keyword(),
                    b.vb_keyword()
                )));
            };
            arithmetic(op, &left, &right, result)
        }
    }
}

fn arithmetic(
    op: BinaryOp,
    left: &ConstValue,
    right: &ConstValue,
    result: SpecialType,
) -> ConvertResult<ConstValue> {
    if matches!(op, BinaryOp::LeftShift | BinaryOp::RightShift) {
        let value = to_integer(&convert_value(left, result)?)?;
        let count = to_integer(&convert_value(right, SpecialType::Int32)?)?;
        let width = result
            .bit_width()
            .ok_or_else(|| fold_error("shift operand is not integral"))?;
        // The count is masked by the operand width.
        let count = (count & i128::from(width - 1)) as u32;
        let shifted = if op == BinaryOp::LeftShift {
            wrap_to(value << count, result)
        } else {
            value >> count
        };
        return make_integral(shifted, result);
    }
    if result == SpecialType::String {
        return Ok(ConstValue::String(format_value(left) + &format_value(right)));
    }

    let left = convert_value(left, result)?;
    let right = convert_value(right, result)?;
    match result {
        SpecialType::Boolean => {
            let (x, y) = (to_bool(&left)?, to_bool(&right)?);
            let value = match op {
                BinaryOp::And => x & y,
                BinaryOp::Or => x | y,
                BinaryOp::Xor => x ^ y,
                _ => return Err(fold_error(format!("{} does not apply to Boolean", op.text()))),
            };
            Ok(ConstValue::Boolean(value))
        }
        SpecialType::Single | SpecialType::Double => {
            let (x, y) = (to_f64(&left)?, to_f64(&right)?);
            let value = match op {
                BinaryOp::Add => x + y,
                BinaryOp::Subtract => x - y,
                BinaryOp::Multiply => x * y,
                BinaryOp::Divide => x / y,
                BinaryOp::Modulo => x % y,
                BinaryOp::Power => x.powf(y),
                _ => return Err(fold_error(format!("{} does not apply to floating values", op.text()))),
            };
            if result == SpecialType::Single {
                Ok(ConstValue::Single(value as f32))
            } else {
                Ok(ConstValue::Double(value))
            }
        }
        SpecialType::Decimal => {
            let (x, y) = (to_decimal(&left)?, to_decimal(&right)?);
            let value = match op {
                BinaryOp::Add => x.checked_add(y),
                BinaryOp::Subtract => x.checked_sub(y),
                BinaryOp::Multiply => x.checked_mul(y),
                _ => {
                    return Err(fold_error(format!(
                        "Decimal {} is evaluated at run time",
                        op.text()
                    )));
                }
            };
            value
                .map(ConstValue::Decimal)
                .ok_or_else(|| fold_error("Decimal overflow"))
        }
        integral if integral.is_integral() => {
            let (x, y) = (to_integer(&left)?, to_integer(&right)?);
            if matches!(op, BinaryOp::IntegerDivide | BinaryOp::Modulo) && y == 0 {
                return Err(fold_error("division by zero"));
            }
            let value = match op {
                BinaryOp::Add => x.checked_add(y),
                BinaryOp::Subtract => x.checked_sub(y),
                BinaryOp::Multiply => x.checked_mul(y),
                BinaryOp::IntegerDivide => x.checked_div(y),
                BinaryOp::Modulo => x.checked_rem(y),
                BinaryOp::And => Some(x & y),
                BinaryOp::Or => Some(x | y),
                BinaryOp::Xor => Some(x ^ y),
                _ => None,
            };
            let value = value.ok_or_else(|| {
                fold_error(format!("{} overflows {}", op.text(), integral.vb_keyword()))
            })?;
            make_integral(value, integral)
        }
        other => Err(fold_error(format!(
            "{} does not apply to {}",
            op.text(),
            other.vb_keyword()
        ))),
    }
}

fn compare(
    op: BinaryOp,
    left: &ConstValue,
    right: &ConstValue,
    a: SpecialType,
    b: SpecialType,
    compare_text: bool,
) -> ConvertResult<bool> {
    use SpecialType::{Boolean, Char, DateTime, Decimal, Double, Single, String};
    let ordering: Option<Ordering> = match (a, b) {
        (String | Char, String | Char) => {
            let (x, y) = (format_value(left), format_value(right));
            if compare_text {
                Some(x.to_lowercase().cmp(&y.to_lowercase()))
            } else {
                Some(x.cmp(&y))
            }
        }
        (DateTime, DateTime) => match (left, right) {
            (ConstValue::Date(x), ConstValue::Date(y)) => Some(x.cmp(y)),
            _ => None,
        },
        // True is -1, so it orders before False.
        (Boolean, Boolean) => Some(to_integer(left)?.cmp(&to_integer(right)?)),
        _ => {
            let common = if a == String || b == String {
                Double
            } else {
                source_numeric_common(a, b).ok_or_else(|| {
                    fold_error(format!(
                        "{} and {} cannot be compared",
                        a.vb_keyword(),
                        b.vb_keyword()
                    ))
                })?
            };
            let x = convert_value(left, common)?;
            let y = convert_value(right, common)?;
            match common {
                Decimal => to_decimal(&x)?.compare(to_decimal(&y)?),
                Single | Double => to_f64(&x)?.partial_cmp(&to_f64(&y)?),
                _ => Some(to_integer(&x)?.cmp(&to_integer(&y)?)),
            }
        }
    };
    // Unordered operands (NaN) are unequal to everything.
    let Some(ordering) = ordering else {
        return Ok(op == BinaryOp::NotEquals);
    };
    Ok(match op {
        BinaryOp::Equals => ordering == Ordering::Equal,
        BinaryOp::NotEquals => ordering != Ordering::Equal,
        BinaryOp::LessThan => ordering == Ordering::Less,
        BinaryOp::LessThanOrEqual => ordering != Ordering::Greater,
        BinaryOp::GreaterThan => ordering == Ordering::Greater,
        BinaryOp::GreaterThanOrEqual => ordering != Ordering::Less,
        _ => false,
    })
}

#[cfg(test)]
#[path = "../tests/constant_folding.rs"]
mod tests;
