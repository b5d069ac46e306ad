//! Syntax trees for the vbcs converter.
//!
//! - `source`: the read-only source-dialect tree (arena + `NodeIndex`), as
//!   handed over by the external front-end
//! - `value`: constant values attached to literals and folded expressions
//! - `target`: the target-dialect tree the converter builds bottom-up
//! - `printer`: a reference printer for target trees (debugging, diagnostic
//!   comments and tests; production formatting is an external collaborator)

pub mod source;
pub use source::{NodeIndex, SourceArena, SourceKind, SourceNode};

pub mod value;
pub use value::{ConstValue, DateValue, DecimalValue};

pub mod target;
pub use target::CsNode;

pub mod printer;
pub use printer::CsPrinter;
