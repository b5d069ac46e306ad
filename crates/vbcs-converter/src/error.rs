//! Conversion errors.
//!
//! `ConversionError` is node-local: it propagates with `?` up to the nearest
//! declaration boundary, where the driver turns it into an error placeholder
//! and a diagnostic. `UnitError` aborts a whole compilation unit and is
//! returned to orchestration.

use thiserror::Error;
use vbcs_common::diagnostic_codes;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("{kind} is not supported: {message}")]
    UnsupportedConstruct { kind: &'static str, message: String },

    #[error("constant evaluation failed: {message}")]
    ConstantEvaluation { message: String },

    #[error("cannot hoist by-reference arguments: {0}")]
    AmbiguousHoist(String),

    #[error("maximum nesting depth exceeded")]
    DepthExceeded,

    #[error("no symbol found for {0}")]
    MissingSymbol(String),
}

impl ConversionError {
    pub fn unsupported(kind: &'static str, message: impl Into<String>) -> Self {
        Self::UnsupportedConstruct {
            kind,
            message: message.into(),
        }
    }

    pub fn constant(message: impl Into<String>) -> Self {
        Self::ConstantEvaluation {
            message: message.into(),
        }
    }

    /// Stable diagnostic code of this error.
    pub const fn code(&self) -> u32 {
        match self {
            Self::UnsupportedConstruct { .. } => diagnostic_codes::UNSUPPORTED_CONSTRUCT,
            Self::ConstantEvaluation { .. } => diagnostic_codes::CONSTANT_EVALUATION_FAILED,
            Self::AmbiguousHoist(_) => diagnostic_codes::AMBIGUOUS_BY_REF_HOIST,
            Self::DepthExceeded => diagnostic_codes::RECURSION_LIMIT,
            Self::MissingSymbol(_) => diagnostic_codes::MISSING_SYMBOL,
        }
    }
}

pub type ConvertResult<T> = Result<T, ConversionError>;

/// Failure that aborts conversion of a whole unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("no semantic model is available for the unit")]
    NoSemanticModel,

    #[error("root node is a {0}, not a compilation unit")]
    NotACompilationUnit(&'static str),

    #[error("root node does not exist in the arena")]
    MissingRoot,

    #[error("conversion was cancelled")]
    Cancelled,
}
