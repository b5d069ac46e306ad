//! Built-in conversion rules of both dialects.
//!
//! # Architecture
//!
//! The source dialect classifies conversions as widening or narrowing over a
//! lattice of primitive types; `Object` is the top, `String` accepts every
//! primitive by narrowing and `Char` widens to `String`. The target dialect
//! classifies them as implicit or explicit, with boxing/unboxing for
//! `object` and implicit constant-expression conversions for in-range
//! integral constants.
//!
//! Both classifications are flag sets so callers can ask several questions
//! at once ("explicit *and* numeric").
//!
//! The operator result-type tables (`source_binary_result`,
//! `target_binary_promotion`) live here too: constant folding follows the
//! source lattice, the conversion analyzer needs the target promotion.

use crate::types::SpecialType;
use bitflags::bitflags;
use vbcs_syntax::source::BinaryOp;
use vbcs_syntax::value::ConstValue;

bitflags! {
    /// Source-dialect conversion classification.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SourceConversion: u16 {
        const EXISTS = 1 << 0;
        const IDENTITY = 1 << 1;
        const WIDENING = 1 << 2;
        const NARROWING = 1 << 3;
        const NUMERIC = 1 << 4;
        /// Conversion to or from `String`
        const STRING = 1 << 5;
        const REFERENCE = 1 << 6;
        const ENUM = 1 << 7;
        const BOOLEAN = 1 << 8;
    }
}

impl SourceConversion {
    pub const fn exists(self) -> bool {
        self.contains(Self::EXISTS)
    }
    pub const fn is_identity(self) -> bool {
        self.contains(Self::IDENTITY)
    }
    pub const fn is_widening(self) -> bool {
        self.contains(Self::WIDENING)
    }
    pub const fn is_narrowing(self) -> bool {
        self.contains(Self::NARROWING)
    }
    pub const fn is_numeric(self) -> bool {
        self.contains(Self::NUMERIC)
    }
}

bitflags! {
    /// Target-dialect conversion classification.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TargetConversion: u16 {
        const EXISTS = 1 << 0;
        const IDENTITY = 1 << 1;
        const IMPLICIT = 1 << 2;
        const EXPLICIT = 1 << 3;
        const NUMERIC = 1 << 4;
        const ENUMERATION = 1 << 5;
        const BOXING = 1 << 6;
        const UNBOXING = 1 << 7;
        const REFERENCE = 1 << 8;
        /// Implicit conversion of an in-range integral constant
        const CONSTANT_EXPRESSION = 1 << 9;
        const NULLABLE = 1 << 10;
    }
}

impl TargetConversion {
    pub const fn exists(self) -> bool {
        self.contains(Self::EXISTS)
    }
    pub const fn is_identity(self) -> bool {
        self.contains(Self::IDENTITY)
    }
    pub const fn is_implicit(self) -> bool {
        self.contains(Self::IMPLICIT)
    }
    pub const fn is_explicit(self) -> bool {
        self.contains(Self::EXPLICIT)
    }
    pub const fn is_numeric(self) -> bool {
        self.contains(Self::NUMERIC)
    }
    pub const fn is_enumeration(self) -> bool {
        self.contains(Self::ENUMERATION)
    }
    pub const fn is_unboxing(self) -> bool {
        self.contains(Self::UNBOXING)
    }
    pub const fn is_reference(self) -> bool {
        self.contains(Self::REFERENCE)
    }
    pub const fn is_constant_expression(self) -> bool {
        self.contains(Self::CONSTANT_EXPRESSION)
    }
}

// =============================================================================
// Source Dialect
// =============================================================================

/// Source-dialect numeric widening (`from` widens to `to`, `from != to`).
pub const fn source_numeric_widens(from: SpecialType, to: SpecialType) -> bool {
    use SpecialType::*;
    matches!(
        (from, to),
        (Byte, Int16 | UInt16 | Int32 | UInt32 | Int64 | UInt64 | Decimal | Single | Double)
            | (SByte, Int16 | Int32 | Int64 | Decimal | Single | Double)
            | (Int16, Int32 | Int64 | Decimal | Single | Double)
            | (UInt16, Int32 | UInt32 | Int64 | UInt64 | Decimal | Single | Double)
            | (Int32, Int64 | Decimal | Single | Double)
            | (UInt32, Int64 | UInt64 | Decimal | Single | Double)
            | (Int64 | UInt64, Decimal | Single | Double)
            | (Decimal, Single | Double)
            | (Single, Double)
    )
}

/// Classify a conversion between two special types under source rules.
pub fn classify_source_special(from: SpecialType, to: SpecialType) -> SourceConversion {
    use SpecialType::*;
    let exists = SourceConversion::EXISTS;
    if from == to {
        return exists | SourceConversion::IDENTITY | SourceConversion::WIDENING;
    }
    if to == Object {
        return exists | SourceConversion::WIDENING | SourceConversion::REFERENCE;
    }
    if from == Object {
        let mut flags = exists | SourceConversion::NARROWING | SourceConversion::REFERENCE;
        if to == String {
            flags |= SourceConversion::STRING;
        }
        return flags;
    }
    if from.is_numeric() && to.is_numeric() {
        let direction = if source_numeric_widens(from, to) {
            SourceConversion::WIDENING
        } else {
            SourceConversion::NARROWING
        };
        return exists | direction | SourceConversion::NUMERIC;
    }
    match (from, to) {
        (Char, String) => exists | SourceConversion::WIDENING | SourceConversion::STRING,
        (String, Char) => exists | SourceConversion::NARROWING | SourceConversion::STRING,
        (String, _) | (_, String) if from != Void && to != Void => {
            exists | SourceConversion::NARROWING | SourceConversion::STRING
        }
        (Boolean, _) if to.is_numeric() => {
            exists | SourceConversion::NARROWING | SourceConversion::BOOLEAN
        }
        (_, Boolean) if from.is_numeric() => {
            exists | SourceConversion::NARROWING | SourceConversion::BOOLEAN
        }
        _ => SourceConversion::empty(),
    }
}

// =============================================================================
// Target Dialect
// =============================================================================

/// Target-dialect implicit numeric conversion (`from != to`).
pub const fn target_numeric_implicit(from: SpecialType, to: SpecialType) -> bool {
    use SpecialType::*;
    matches!(
        (from, to),
        (SByte, Int16 | Int32 | Int64 | Single | Double | Decimal)
            | (Byte, Int16 | UInt16 | Int32 | UInt32 | Int64 | UInt64 | Single | Double | Decimal)
            | (Int16, Int32 | Int64 | Single | Double | Decimal)
            | (UInt16, Int32 | UInt32 | Int64 | UInt64 | Single | Double | Decimal)
            | (Int32, Int64 | Single | Double | Decimal)
            | (UInt32, Int64 | UInt64 | Single | Double | Decimal)
            | (Int64 | UInt64, Single | Double | Decimal)
            | (Char, UInt16 | Int32 | UInt32 | Int64 | UInt64 | Single | Double | Decimal)
            | (Single, Double)
    )
}

/// Whether an integral constant fits `to` so the target dialect converts it
/// implicitly (`const int` -> `byte` etc.).
pub fn fits_implicit_constant(from: SpecialType, to: SpecialType, value: &ConstValue) -> bool {
    use SpecialType::*;
    let Some(v) = value.as_i128() else {
        return false;
    };
    let applies = match from {
        Int32 => matches!(to, SByte | Byte | Int16 | UInt16 | UInt32 | UInt64),
        Int64 => matches!(to, UInt64),
        _ => false,
    };
    if !applies {
        return false;
    }
    to.integral_range().is_some_and(|(lo, hi)| v >= lo && v <= hi)
}

/// Classify a conversion between two special types under target rules.
pub fn classify_target_special(
    from: SpecialType,
    to: SpecialType,
    constant: Option<&ConstValue>,
) -> TargetConversion {
    use SpecialType::*;
    let exists = TargetConversion::EXISTS;
    if from == to {
        return exists | TargetConversion::IDENTITY | TargetConversion::IMPLICIT;
    }
    if to == Object {
        let kind = if from.is_value_type() {
            TargetConversion::BOXING
        } else {
            TargetConversion::REFERENCE
        };
        return exists | TargetConversion::IMPLICIT | kind;
    }
    if from == Object {
        let kind = if to.is_value_type() {
            TargetConversion::UNBOXING
        } else {
            TargetConversion::REFERENCE
        };
        return exists | TargetConversion::EXPLICIT | kind;
    }
    let numeric_like = |t: SpecialType| t.is_numeric() || t == Char;
    if numeric_like(from) && numeric_like(to) {
        if target_numeric_implicit(from, to) {
            return exists | TargetConversion::IMPLICIT | TargetConversion::NUMERIC;
        }
        if let Some(value) = constant
            && fits_implicit_constant(from, to, value)
        {
            return exists
                | TargetConversion::IMPLICIT
                | TargetConversion::NUMERIC
                | TargetConversion::CONSTANT_EXPRESSION;
        }
        return exists | TargetConversion::EXPLICIT | TargetConversion::NUMERIC;
    }
    TargetConversion::empty()
}

// =============================================================================
// Operator Result Types
// =============================================================================

/// Smallest signed integral type holding both a signed and an unsigned type.
fn mixed_sign_integral(signed: SpecialType, unsigned: SpecialType) -> Option<SpecialType> {
    use SpecialType::*;
    let signed_width = signed.bit_width()?;
    let unsigned_width = unsigned.bit_width()?;
    let needed = signed_width.max(unsigned_width * 2);
    match needed {
        8 => Some(SByte),
        16 => Some(Int16),
        32 => Some(Int32),
        64 => Some(Int64),
        _ => None,
    }
}

/// Wider of two integral types under the source lattice. `None` for
/// `ULong` mixed with a signed type, which has no integral common type.
pub fn source_widest_integral(a: SpecialType, b: SpecialType) -> Option<SpecialType> {
    if a == b {
        return Some(a);
    }
    if !a.is_integral() || !b.is_integral() {
        return None;
    }
    match (a.is_unsigned(), b.is_unsigned()) {
        (true, true) | (false, false) => {
            if a.bit_width()? >= b.bit_width()? {
                Some(a)
            } else {
                Some(b)
            }
        }
        (false, true) => mixed_sign_integral(a, b),
        (true, false) => mixed_sign_integral(b, a),
    }
}

/// Operand type used for `Boolean` in arithmetic.
const fn arithmetic_operand(t: SpecialType) -> SpecialType {
    match t {
        SpecialType::Boolean => SpecialType::Int16,
        other => other,
    }
}

/// Common numeric type of two operands for `+ - * Mod` and comparisons.
pub fn source_numeric_common(a: SpecialType, b: SpecialType) -> Option<SpecialType> {
    use SpecialType::*;
    let a = arithmetic_operand(a);
    let b = arithmetic_operand(b);
    if !a.is_numeric() || !b.is_numeric() {
        return None;
    }
    if a == Double || b == Double {
        return Some(Double);
    }
    if a == Single || b == Single {
        return Some(Single);
    }
    if a == Decimal || b == Decimal {
        return Some(Decimal);
    }
    // ULong mixed with a signed type widens to Decimal.
    Some(source_widest_integral(a, b).unwrap_or(Decimal))
}

/// Integral operand type of `\`, `And`/`Or`/`Xor` on non-Boolean operands and
/// shifts: floating and decimal operands become `Long`.
const fn integral_operand(t: SpecialType) -> SpecialType {
    match t {
        SpecialType::Single | SpecialType::Double | SpecialType::Decimal | SpecialType::String => {
            SpecialType::Int64
        }
        SpecialType::Boolean => SpecialType::Int16,
        other => other,
    }
}

/// Result type of a binary operator applied to two special types under
/// source-dialect rules. `None` when the operator does not apply.
pub fn source_binary_result(op: BinaryOp, a: SpecialType, b: SpecialType) -> Option<SpecialType> {
    use SpecialType::*;
    match op {
        BinaryOp::Concatenate => Some(String),
        BinaryOp::Equals
        | BinaryOp::NotEquals
        | BinaryOp::LessThan
        | BinaryOp::LessThanOrEqual
        | BinaryOp::GreaterThan
        | BinaryOp::GreaterThanOrEqual
        | BinaryOp::Is
        | BinaryOp::IsNot
        | BinaryOp::Like
        | BinaryOp::AndAlso
        | BinaryOp::OrElse => Some(Boolean),
        BinaryOp::Power => Some(Double),
        BinaryOp::Add if a == String && b == String => Some(String),
        BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Modulo => {
            if a == String || b == String {
                return Some(Double);
            }
            source_numeric_common(a, b)
        }
        BinaryOp::Divide => {
            if a == String || b == String {
                return Some(Double);
            }
            match source_numeric_common(a, b)? {
                Single => Some(Single),
                Decimal => Some(Decimal),
                _ => Some(Double),
            }
        }
        BinaryOp::IntegerDivide => {
            source_widest_integral(integral_operand(a), integral_operand(b)).or(Some(Int64))
        }
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => {
            if a == Boolean && b == Boolean {
                return Some(Boolean);
            }
            source_widest_integral(integral_operand(a), integral_operand(b))
        }
        BinaryOp::LeftShift | BinaryOp::RightShift => {
            let left = integral_operand(a);
            left.is_integral().then_some(left)
        }
    }
}

/// Binary numeric promotion of the target dialect: `byte + byte` is `int`.
pub fn target_binary_promotion(a: SpecialType, b: SpecialType) -> Option<SpecialType> {
    use SpecialType::*;
    let numeric_like = |t: SpecialType| t.is_numeric() || t == Char;
    if !numeric_like(a) || !numeric_like(b) {
        return None;
    }
    if a == Decimal || b == Decimal {
        // decimal does not mix with floating types
        return (!a.is_floating() && !b.is_floating()).then_some(Decimal);
    }
    if a == Double || b == Double {
        return Some(Double);
    }
    if a == Single || b == Single {
        return Some(Single);
    }
    if a == UInt64 || b == UInt64 {
        let other = if a == UInt64 { b } else { a };
        return (other.is_unsigned() || other == Char || other == UInt64).then_some(UInt64);
    }
    if a == Int64 || b == Int64 {
        return Some(Int64);
    }
    if a == UInt32 || b == UInt32 {
        let other = if a == UInt32 { b } else { a };
        if matches!(other, SByte | Int16 | Int32) {
            return Some(Int64);
        }
        return Some(UInt32);
    }
    Some(Int32)
}

/// Unary numeric promotion of the target dialect (`-b` for a byte is `int`).
pub fn target_unary_promotion(a: SpecialType) -> Option<SpecialType> {
    use SpecialType::*;
    match a {
        SByte | Byte | Int16 | UInt16 | Char => Some(Int32),
        t if t.is_numeric() => Some(t),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../tests/conversions.rs"]
mod tests;
