//! Semantics-aware tree rewriting from the source dialect to the target
//! dialect.
//!
//! This crate is organized into:
//! - `options` - `ConversionOptions` and cooperative cancellation
//! - `error` - node-local `ConversionError` and unit-level `UnitError`
//! - `context` - per-unit `ConversionContext` (name scopes, hoisting frames,
//!   breakables, method and type frames, handles table, extra imports)
//! - `namer` - collision-free synthesized identifiers
//! - `literals` - literal rendering
//! - `constant_folding` - compile-time evaluation under source rules
//! - `type_conversions` - classification of the conversion each expression
//!   needs
//! - `type_names` - target spellings of written and resolved types
//! - `converter` - the rewrite rules
//! - `driver` - `convert_unit`, the per-unit entry point

pub mod constant_folding;
pub mod context;
pub mod converter;
pub mod driver;
pub mod error;
pub mod literals;
pub mod namer;
pub mod options;
pub mod type_conversions;
pub mod type_names;

pub use constant_folding::ConstantFolder;
pub use context::ConversionContext;
pub use converter::Converter;
pub use driver::{ConvertedUnit, MemberOutcome, UnitStats, convert_unit};
pub use error::{ConversionError, ConvertResult, UnitError};
pub use options::{CancellationFlag, ConversionOptions};
pub use type_conversions::{ConversionKind, ConversionSite, TypeConversionAnalyzer};
