//! Diagnostic types reported while converting a compilation unit.
//!
//! Diagnostics never abort conversion. They travel next to the converted tree
//! so orchestration can surface them, and they serialize with `serde` for
//! tooling that wants machine-readable output.

use serde::Serialize;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Message = 2,
}

/// A conversion diagnostic anchored to a span of the source text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    /// Display name of the member the diagnostic belongs to, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub const fn error(start: u32, length: u32, message: String, code: u32) -> Self {
        Self {
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Error,
            code,
            member: None,
        }
    }

    /// Create a new warning diagnostic.
    #[must_use]
    pub const fn warning(start: u32, length: u32, message: String, code: u32) -> Self {
        Self {
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Warning,
            code,
            member: None,
        }
    }

    /// Create an informational diagnostic.
    #[must_use]
    pub const fn message(start: u32, length: u32, message: String, code: u32) -> Self {
        Self {
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Message,
            code,
            member: None,
        }
    }

    /// Attach the owning member's display name.
    #[must_use]
    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }

    pub const fn is_error(&self) -> bool {
        matches!(self.category, DiagnosticCategory::Error)
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Stable diagnostic codes and message templates.
pub mod diagnostic_codes {
    pub const UNSUPPORTED_CONSTRUCT: u32 = 1001;
    pub const CONSTANT_EVALUATION_FAILED: u32 = 1002;
    pub const AMBIGUOUS_BY_REF_HOIST: u32 = 1003;
    pub const RECURSION_LIMIT: u32 = 1004;
    pub const MISSING_SYMBOL: u32 = 1005;
    pub const QUALIFICATION_REVERTED: u32 = 2001;

    pub const UNSUPPORTED_CONSTRUCT_TEMPLATE: &str = "Cannot convert {0}: {1}";
    pub const CONSTANT_EVALUATION_TEMPLATE: &str = "Constant expression could not be folded: {0}";
    pub const QUALIFICATION_REVERTED_TEMPLATE: &str = "Qualified reference {0} does not resolve to {1}; kept the simple name";
}

#[cfg(test)]
#[path = "../tests/diagnostics.rs"]
mod tests;
