//! Centralized limits for the converter.
//!
//! Source trees are produced by an external front-end and may be arbitrarily
//! deep. Every recursive walk checks one of these limits and reports a
//! member-local error instead of overflowing the stack.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting of expressions converted in a single statement.
///
/// Deeply nested binary chains (`a & b & c & ...`) are the usual offender.
pub const MAX_EXPRESSION_DEPTH: u32 = 500;

/// Maximum nesting of statement blocks inside one member body.
pub const MAX_STATEMENT_DEPTH: u32 = 200;

/// Maximum nesting of namespace/type blocks.
pub const MAX_DECLARATION_DEPTH: u32 = 100;

/// Maximum depth of recursive constant folding.
pub const MAX_CONSTANT_FOLD_DEPTH: u32 = 256;

// =============================================================================
// Name Synthesis
// =============================================================================

/// Upper bound on numeric suffixes tried when synthesizing a unique name.
///
/// Reaching it means the visible-name set is pathological; the namer then
/// falls back to the last candidate.
pub const MAX_UNIQUE_NAME_ATTEMPTS: u32 = 10_000;
