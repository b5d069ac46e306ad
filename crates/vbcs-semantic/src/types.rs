//! Type table entries.
//!
//! Types are addressed by `TypeId`. The first ids are reserved for the
//! primitive (special) types so both dialects can refer to them without a
//! lookup; user types, arrays, nullables and enums are appended by the host.

use vbcs_syntax::value::ConstValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const ERROR: Self = Self(0);
    pub const OBJECT: Self = Self(1);
    pub const BOOLEAN: Self = Self(2);
    pub const BYTE: Self = Self(3);
    pub const SBYTE: Self = Self(4);
    pub const INT16: Self = Self(5);
    pub const UINT16: Self = Self(6);
    pub const INT32: Self = Self(7);
    pub const UINT32: Self = Self(8);
    pub const INT64: Self = Self(9);
    pub const UINT64: Self = Self(10);
    pub const SINGLE: Self = Self(11);
    pub const DOUBLE: Self = Self(12);
    pub const DECIMAL: Self = Self(13);
    pub const CHAR: Self = Self(14);
    pub const STRING: Self = Self(15);
    pub const DATE: Self = Self(16);
    pub const VOID: Self = Self(17);

    /// First id available for host-defined types.
    pub const FIRST_USER: u32 = 18;

    /// The reserved id of a special type.
    pub const fn of_special(special: SpecialType) -> Self {
        match special {
            SpecialType::Object => Self::OBJECT,
            SpecialType::Boolean => Self::BOOLEAN,
            SpecialType::Byte => Self::BYTE,
            SpecialType::SByte => Self::SBYTE,
            SpecialType::Int16 => Self::INT16,
            SpecialType::UInt16 => Self::UINT16,
            SpecialType::Int32 => Self::INT32,
            SpecialType::UInt32 => Self::UINT32,
            SpecialType::Int64 => Self::INT64,
            SpecialType::UInt64 => Self::UINT64,
            SpecialType::Single => Self::SINGLE,
            SpecialType::Double => Self::DOUBLE,
            SpecialType::Decimal => Self::DECIMAL,
            SpecialType::Char => Self::CHAR,
            SpecialType::String => Self::STRING,
            SpecialType::DateTime => Self::DATE,
            SpecialType::Void => Self::VOID,
        }
    }
}

// =============================================================================
// Special Types
// =============================================================================

/// Primitive types shared by both dialects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecialType {
    Object,
    Boolean,
    Byte,
    SByte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    Char,
    String,
    DateTime,
    Void,
}

impl SpecialType {
    pub const ALL: [Self; 17] = [
        Self::Object,
        Self::Boolean,
        Self::Byte,
        Self::SByte,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::Single,
        Self::Double,
        Self::Decimal,
        Self::Char,
        Self::String,
        Self::DateTime,
        Self::Void,
    ];

    /// Keyword (or well-known name) in the target dialect.
    pub const fn cs_keyword(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Boolean => "bool",
            Self::Byte => "byte",
            Self::SByte => "sbyte",
            Self::Int16 => "short",
            Self::UInt16 => "ushort",
            Self::Int32 => "int",
            Self::UInt32 => "uint",
            Self::Int64 => "long",
            Self::UInt64 => "ulong",
            Self::Single => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Char => "char",
            Self::String => "string",
            Self::DateTime => "DateTime",
            Self::Void => "void",
        }
    }

    /// Keyword in the source dialect.
    pub const fn vb_keyword(self) -> &'static str {
        match self {
            Self::Object => "Object",
            Self::Boolean => "Boolean",
            Self::Byte => "Byte",
            Self::SByte => "SByte",
            Self::Int16 => "Short",
            Self::UInt16 => "UShort",
            Self::Int32 => "Integer",
            Self::UInt32 => "UInteger",
            Self::Int64 => "Long",
            Self::UInt64 => "ULong",
            Self::Single => "Single",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
            Self::Char => "Char",
            Self::String => "String",
            Self::DateTime => "Date",
            Self::Void => "Void",
        }
    }

    /// Resolve a source-dialect type keyword or its framework name.
    pub fn from_vb_name(name: &str) -> Option<Self> {
        let lowered = name.to_ascii_lowercase();
        let simple = lowered.strip_prefix("system.").unwrap_or(&lowered);
        let special = match simple {
            "object" => Self::Object,
            "boolean" => Self::Boolean,
            "byte" => Self::Byte,
            "sbyte" => Self::SByte,
            "short" | "int16" => Self::Int16,
            "ushort" | "uint16" => Self::UInt16,
            "integer" | "int32" => Self::Int32,
            "uinteger" | "uint32" => Self::UInt32,
            "long" | "int64" => Self::Int64,
            "ulong" | "uint64" => Self::UInt64,
            "single" => Self::Single,
            "double" => Self::Double,
            "decimal" => Self::Decimal,
            "char" => Self::Char,
            "string" => Self::String,
            "date" | "datetime" => Self::DateTime,
            "void" => Self::Void,
            _ => return None,
        };
        Some(special)
    }

    /// Name of the `Conversions.ToXxx` runtime helper, if any.
    pub const fn conversion_helper(self) -> Option<&'static str> {
        let name = match self {
            Self::Boolean => "ToBoolean",
            Self::Byte => "ToByte",
            Self::SByte => "ToSByte",
            Self::Int16 => "ToShort",
            Self::UInt16 => "ToUShort",
            Self::Int32 => "ToInteger",
            Self::UInt32 => "ToUInteger",
            Self::Int64 => "ToLong",
            Self::UInt64 => "ToULong",
            Self::Single => "ToSingle",
            Self::Double => "ToDouble",
            Self::Decimal => "ToDecimal",
            Self::Char => "ToChar",
            Self::String => "ToString",
            Self::DateTime => "ToDate",
            Self::Object | Self::Void => return None,
        };
        Some(name)
    }

    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::SByte
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
        )
    }

    pub const fn is_unsigned(self) -> bool {
        matches!(self, Self::Byte | Self::UInt16 | Self::UInt32 | Self::UInt64)
    }

    pub const fn is_floating(self) -> bool {
        matches!(self, Self::Single | Self::Double)
    }

    pub const fn is_numeric(self) -> bool {
        self.is_integral() || self.is_floating() || matches!(self, Self::Decimal)
    }

    pub const fn is_value_type(self) -> bool {
        !matches!(self, Self::Object | Self::String | Self::Void)
    }

    /// Width in bits of integral types.
    pub const fn bit_width(self) -> Option<u32> {
        match self {
            Self::Byte | Self::SByte => Some(8),
            Self::Int16 | Self::UInt16 => Some(16),
            Self::Int32 | Self::UInt32 => Some(32),
            Self::Int64 | Self::UInt64 => Some(64),
            _ => None,
        }
    }

    /// Inclusive value range of integral types.
    pub const fn integral_range(self) -> Option<(i128, i128)> {
        let range = match self {
            Self::Byte => (0, u8::MAX as i128),
            Self::SByte => (i8::MIN as i128, i8::MAX as i128),
            Self::Int16 => (i16::MIN as i128, i16::MAX as i128),
            Self::UInt16 => (0, u16::MAX as i128),
            Self::Int32 => (i32::MIN as i128, i32::MAX as i128),
            Self::UInt32 => (0, u32::MAX as i128),
            Self::Int64 => (i64::MIN as i128, i64::MAX as i128),
            Self::UInt64 => (0, u64::MAX as i128),
            _ => return None,
        };
        Some(range)
    }

    /// Special type of a constant value (`Nothing` has none).
    pub fn of_value(value: &ConstValue) -> Option<Self> {
        let special = match value {
            ConstValue::Nothing => return None,
            ConstValue::Boolean(_) => Self::Boolean,
            ConstValue::Byte(_) => Self::Byte,
            ConstValue::SByte(_) => Self::SByte,
            ConstValue::Int16(_) => Self::Int16,
            ConstValue::UInt16(_) => Self::UInt16,
            ConstValue::Int32(_) => Self::Int32,
            ConstValue::UInt32(_) => Self::UInt32,
            ConstValue::Int64(_) => Self::Int64,
            ConstValue::UInt64(_) => Self::UInt64,
            ConstValue::Single(_) => Self::Single,
            ConstValue::Double(_) => Self::Double,
            ConstValue::Decimal(_) => Self::Decimal,
            ConstValue::Char(_) => Self::Char,
            ConstValue::String(_) => Self::String,
            ConstValue::Date(_) => Self::DateTime,
        };
        Some(special)
    }
}

// =============================================================================
// Type Info
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Special(SpecialType),
    Enum { underlying: TypeId },
    Array { element: TypeId, rank: u32 },
    Nullable { underlying: TypeId },
    Class,
    /// Source-dialect `Module` (all members shared)
    Module,
    Structure,
    Interface,
    Delegate,
    TypeParameter,
    Error,
}

/// A type known to the semantic model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: String,
    pub namespace: Option<String>,
    pub kind: TypeKind,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>, namespace: Option<&str>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.map(str::to_string),
            kind,
        }
    }

    pub const fn special(&self) -> Option<SpecialType> {
        match self.kind {
            TypeKind::Special(special) => Some(special),
            _ => None,
        }
    }

    pub const fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum { .. })
    }

    pub const fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array { .. })
    }

    /// Value types: primitives other than `Object`/`String`, enums and
    /// structures. Nullable value types count as references here since
    /// their default is `null`.
    pub const fn is_value_type(&self) -> bool {
        match self.kind {
            TypeKind::Special(special) => special.is_value_type(),
            TypeKind::Enum { .. } | TypeKind::Structure => true,
            _ => false,
        }
    }

    pub const fn is_reference_type(&self) -> bool {
        match self.kind {
            TypeKind::Special(special) => !special.is_value_type(),
            TypeKind::Array { .. }
            | TypeKind::Class
            | TypeKind::Module
            | TypeKind::Interface
            | TypeKind::Delegate => true,
            _ => false,
        }
    }

    /// `Namespace.Name`, or just the name for global types.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(namespace) if !namespace.is_empty() => format!("{namespace}.{}", self.name),
            _ => self.name.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/types.rs"]
mod tests;
