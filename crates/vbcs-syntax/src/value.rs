//! Constant values.
//!
//! Literals carry the value the front-end computed for them, and the
//! semantic model annotates constant expressions with the same type. Each
//! variant corresponds to one primitive type of the source dialect.

use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    /// `Nothing`
    Nothing,
    Boolean(bool),
    Byte(u8),
    SByte(i8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Single(f32),
    Double(f64),
    Decimal(DecimalValue),
    Char(char),
    String(String),
    Date(DateValue),
}

impl ConstValue {
    pub const fn is_integral(&self) -> bool {
        matches!(
            self,
            Self::Byte(_)
                | Self::SByte(_)
                | Self::Int16(_)
                | Self::UInt16(_)
                | Self::Int32(_)
                | Self::UInt32(_)
                | Self::Int64(_)
                | Self::UInt64(_)
        )
    }

    pub const fn is_floating(&self) -> bool {
        matches!(self, Self::Single(_) | Self::Double(_))
    }

    pub const fn is_numeric(&self) -> bool {
        self.is_integral() || self.is_floating() || matches!(self, Self::Decimal(_))
    }

    /// Integral payload widened to `i128` (covers the full `u64` range).
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Self::Byte(v) => Some(i128::from(v)),
            Self::SByte(v) => Some(i128::from(v)),
            Self::Int16(v) => Some(i128::from(v)),
            Self::UInt16(v) => Some(i128::from(v)),
            Self::Int32(v) => Some(i128::from(v)),
            Self::UInt32(v) => Some(i128::from(v)),
            Self::Int64(v) => Some(i128::from(v)),
            Self::UInt64(v) => Some(i128::from(v)),
            _ => None,
        }
    }

    /// Numeric payload as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Single(v) => Some(f64::from(*v)),
            Self::Double(v) => Some(*v),
            Self::Decimal(d) => Some(d.to_f64()),
            other => other.as_i128().map(|v| v as f64),
        }
    }
}

// =============================================================================
// Date
// =============================================================================

/// Date literal value (`#2000-01-02 13:45:00#`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateValue {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateValue {
    pub const fn date(year: u16, month: u8, day: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    pub const fn has_time(&self) -> bool {
        self.hour != 0 || self.minute != 0 || self.second != 0
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)?;
        if self.has_time() {
            write!(f, " {:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        }
        Ok(())
    }
}

// =============================================================================
// Decimal
// =============================================================================

/// Fixed-point decimal: `mantissa * 10^-scale`.
///
/// Only what constant folding needs: exact add/subtract/multiply, comparison
/// and rendering. Division is left to the runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecimalValue {
    pub mantissa: i128,
    pub scale: u32,
}

/// Largest magnitude representable by the 96-bit runtime decimal.
const DECIMAL_MAX_MANTISSA: i128 = (1_i128 << 96) - 1;
const DECIMAL_MAX_SCALE: u32 = 28;

impl DecimalValue {
    pub const fn from_integer(value: i128) -> Self {
        Self {
            mantissa: value,
            scale: 0,
        }
    }

    /// Parse the text of a decimal literal without its suffix (`12.50`).
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        let mut mantissa: i128 = 0;
        for ch in int_part.chars().chain(frac_part.chars()) {
            let digit = ch.to_digit(10)?;
            mantissa = mantissa.checked_mul(10)?.checked_add(i128::from(digit))?;
        }
        let scale = frac_part.len() as u32;
        let value = Self {
            mantissa: if negative { -mantissa } else { mantissa },
            scale,
        };
        value.checked()
    }

    pub fn to_f64(&self) -> f64 {
        self.mantissa as f64 / 10f64.powi(self.scale as i32)
    }

    fn checked(self) -> Option<Self> {
        if self.mantissa.abs() > DECIMAL_MAX_MANTISSA || self.scale > DECIMAL_MAX_SCALE {
            return None;
        }
        Some(self)
    }

    fn rescale(self, scale: u32) -> Option<i128> {
        let factor = 10_i128.checked_pow(scale.checked_sub(self.scale)?)?;
        self.mantissa.checked_mul(factor)
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        let scale = self.scale.max(other.scale);
        let sum = self.rescale(scale)?.checked_add(other.rescale(scale)?)?;
        Self {
            mantissa: sum,
            scale,
        }
        .checked()
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.checked_add(Self {
            mantissa: -other.mantissa,
            scale: other.scale,
        })
    }

    pub fn checked_mul(self, other: Self) -> Option<Self> {
        Self {
            mantissa: self.mantissa.checked_mul(other.mantissa)?,
            scale: self.scale + other.scale,
        }
        .checked()
    }

    /// Compare two decimals by value.
    pub fn compare(self, other: Self) -> Option<std::cmp::Ordering> {
        let scale = self.scale.max(other.scale);
        Some(self.rescale(scale)?.cmp(&other.rescale(scale)?))
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{int_part}.{frac_part}")
    }
}

#[cfg(test)]
#[path = "../tests/value.rs"]
mod tests;
