//! Common types and utilities for the vbcs converter.
//!
//! This crate provides foundational types used across all vbcs crates:
//! - Conversion diagnostics (`Diagnostic`, `DiagnosticCategory`, codes)
//! - Conversion limits (recursion depths)
//! - Case-insensitive identifier helpers for the source dialect

// Diagnostics reported by the converter
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, diagnostic_codes, format_message};

// Centralized limits
pub mod limits;

// Identifier comparison rules of the source dialect
pub mod names;
pub use names::{NameKey, NameSet, name_set, names_equal};
