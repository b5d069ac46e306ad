//! Semantic layer interface for the vbcs converter.
//!
//! - `types`: `TypeId`, special (primitive) types and the type table entries
//! - `symbols`: resolved symbols, parameters and passing modes
//! - `model`: the `SemanticModel` trait the converter queries
//! - `conversions`: built-in conversion classification of both dialects
//! - `table`: `SemanticTable`, an in-memory `SemanticModel`

pub mod types;
pub use types::{SpecialType, TypeId, TypeInfo, TypeKind};

pub mod symbols;
pub use symbols::{ParameterInfo, PassingMode, Symbol, SymbolId, SymbolKind};

pub mod model;
pub use model::{ControlFlowInfo, DataFlowInfo, SemanticModel};

pub mod conversions;
pub use conversions::{SourceConversion, TargetConversion};

pub mod table;
pub use table::SemanticTable;

// Constant values are produced by the front-end and annotated by the model.
pub use vbcs_syntax::value::ConstValue;
