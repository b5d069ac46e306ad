//! `vbcs` converts VB.NET-style syntax trees into C#-style syntax trees.
//!
//! The work happens in the member crates; this facade re-exports them and
//! adds what a host needs around the per-unit engine:
//! - `load_options` - read `ConversionOptions` from a JSON file
//! - `convert_units` - convert independent compilation units in parallel
//! - `tracing_config` - subscriber setup driven by `VBCS_LOG`

use std::path::Path;

use anyhow::Context;
use rayon::prelude::*;
use tracing::{debug, info_span};

pub mod tracing_config;

pub use vbcs_common as common;
pub use vbcs_converter as converter;
pub use vbcs_semantic as semantic;
pub use vbcs_syntax as syntax;

pub use vbcs_common::{Diagnostic, DiagnosticCategory};
pub use vbcs_converter::{
    CancellationFlag, ConversionError, ConversionOptions, ConvertedUnit, MemberOutcome, UnitError,
    UnitStats, convert_unit,
};
pub use vbcs_semantic::{SemanticModel, SemanticTable};
pub use vbcs_syntax::printer::CsPrinter;
pub use vbcs_syntax::source::{NodeIndex, SourceArena};
pub use vbcs_syntax::target::CsNode;

/// Read conversion options from a JSON file.
///
/// Keys are camelCase; missing keys keep their defaults.
pub fn load_options(path: impl AsRef<Path>) -> anyhow::Result<ConversionOptions> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read options file {}", path.display()))?;
    parse_options(&text).with_context(|| format!("invalid options file {}", path.display()))
}

/// Parse conversion options from JSON text.
pub fn parse_options(text: &str) -> anyhow::Result<ConversionOptions> {
    let options = serde_json::from_str(text)?;
    debug!(?options, "options loaded");
    Ok(options)
}

/// One compilation unit handed to `convert_units`.
#[derive(Clone, Copy)]
pub struct UnitInput<'a> {
    pub arena: &'a SourceArena,
    pub root: NodeIndex,
    pub model: Option<&'a (dyn SemanticModel + Sync)>,
}

/// Convert every unit in parallel, each with its own context.
///
/// Results come back in input order. One shared `cancellation` flag stops
/// every unit that has not finished.
pub fn convert_units(
    units: &[UnitInput<'_>],
    options: &ConversionOptions,
    cancellation: Option<&CancellationFlag>,
) -> Vec<Result<ConvertedUnit, UnitError>> {
    let _span = info_span!("convert_units", count = units.len()).entered();
    let results: Vec<_> = units
        .par_iter()
        .map(|unit| {
            let model = unit.model.map(|model| model as &dyn SemanticModel);
            convert_unit(unit.arena, unit.root, model, options, cancellation.cloned())
        })
        .collect();
    let failed = results.iter().filter(|result| result.is_err()).count();
    debug!(converted = results.len() - failed, failed, "units converted");
    results
}

/// Sum of the per-unit counters over every unit that converted.
pub fn total_stats(results: &[Result<ConvertedUnit, UnitError>]) -> UnitStats {
    results
        .iter()
        .flatten()
        .map(ConvertedUnit::stats)
        .fold(UnitStats::default(), |total, stats| UnitStats {
            converted_members: total.converted_members + stats.converted_members,
            error_placeholders: total.error_placeholders + stats.error_placeholders,
            diagnostics: total.diagnostics + stats.diagnostics,
        })
}
