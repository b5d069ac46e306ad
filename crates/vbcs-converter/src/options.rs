//! Conversion options.
//!
//! File-level defaults come from a camelCase JSON document (loaded by the
//! root crate); `Option` statements at the top of a unit override them for
//! that unit only.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use vbcs_syntax::source::OptionStatement;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionOptions {
    /// `Option Compare Text`: string comparisons ignore case
    pub option_compare_text: bool,
    pub option_strict: bool,
    /// Untyped `Dim x = ...` declarations infer their type (`var`)
    pub option_infer: bool,
    /// Namespace wrapped around unit members declared outside any namespace
    pub root_namespace: Option<String>,
    /// Qualify references to module members with the module name
    pub qualify_module_members: bool,
    /// Use `Conversions.ToXxx` for narrowing conversions instead of casts
    pub emit_runtime_conversions: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            option_compare_text: false,
            option_strict: false,
            option_infer: true,
            root_namespace: None,
            qualify_module_members: true,
            emit_runtime_conversions: true,
        }
    }
}

impl ConversionOptions {
    /// Effective options for a unit carrying `statements`.
    #[must_use]
    pub fn with_unit_options(&self, statements: &[OptionStatement]) -> Self {
        let mut options = self.clone();
        for statement in statements {
            match *statement {
                OptionStatement::Strict(on) => options.option_strict = on,
                OptionStatement::Infer(on) => options.option_infer = on,
                OptionStatement::CompareText(text) => options.option_compare_text = text,
                // Undeclared variables are rejected by the front-end already.
                OptionStatement::Explicit(_) => {}
            }
        }
        options
    }
}

/// Cooperative cancellation shared between the host and running conversions.
///
/// Checked between declarations only; a declaration in progress always
/// completes.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
#[path = "../tests/options.rs"]
mod tests;
