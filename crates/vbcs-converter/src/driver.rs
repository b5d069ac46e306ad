//! Per-unit conversion driver.
//!
//! `convert_unit` is the entry point orchestration calls once per source
//! compilation unit. It checks the unit, applies the unit's `Option`
//! statements, runs the converter and assembles a `ConvertedUnit`. Member
//! failures are already folded into placeholders by then; only unit-level
//! problems come back as `UnitError`.

use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, info_span, instrument};
use vbcs_common::Diagnostic;
use vbcs_semantic::SemanticModel;
use vbcs_syntax::source::{NodeIndex, SourceArena, SourceKind};
use vbcs_syntax::target::CsNode;

use crate::converter::Converter;
use crate::error::UnitError;
use crate::options::{CancellationFlag, ConversionOptions};

/// What became of one source member.
#[derive(Clone, Debug, PartialEq)]
pub enum MemberOutcome {
    Converted {
        /// `Type.Member`
        name: String,
        nodes: Vec<CsNode>,
    },
    ErrorPlaceholder {
        kind: String,
        original_text: String,
        message: String,
    },
}

impl MemberOutcome {
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::ErrorPlaceholder { .. })
    }
}

/// Result of converting one compilation unit.
#[derive(Clone, Debug)]
pub struct ConvertedUnit {
    pub root: CsNode,
    /// Namespaces the converted code needs beyond the unit's own imports,
    /// in first-use order
    pub extra_imports: IndexSet<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub members: Vec<MemberOutcome>,
}

/// Summary counters, for logging and reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStats {
    pub converted_members: usize,
    pub error_placeholders: usize,
    pub diagnostics: usize,
}

impl ConvertedUnit {
    pub fn stats(&self) -> UnitStats {
        let error_placeholders = self.members.iter().filter(|m| m.is_error()).count();
        UnitStats {
            converted_members: self.members.len() - error_placeholders,
            error_placeholders,
            diagnostics: self.diagnostics.len(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Convert the compilation unit rooted at `root`.
#[instrument(level = "debug", skip_all, fields(root = root.0))]
pub fn convert_unit(
    arena: &SourceArena,
    root: NodeIndex,
    model: Option<&dyn SemanticModel>,
    options: &ConversionOptions,
    cancellation: Option<CancellationFlag>,
) -> Result<ConvertedUnit, UnitError> {
    let model = model.ok_or(UnitError::NoSemanticModel)?;
    let Some(kind) = arena.kind(root) else {
        return Err(UnitError::MissingRoot);
    };
    let SourceKind::CompilationUnit {
        options: unit_options,
        imports,
        members,
    } = kind
    else {
        return Err(UnitError::NotACompilationUnit(kind.name()));
    };
    if cancellation.as_ref().is_some_and(CancellationFlag::is_cancelled) {
        return Err(UnitError::Cancelled);
    }

    let options = options.with_unit_options(unit_options);
    let mut converter = Converter::new(arena, model, options);
    if let Some(flag) = cancellation {
        converter = converter.with_cancellation(flag);
    }
    let root_node = {
        let _span = info_span!("members", count = members.len()).entered();
        converter.convert_unit_members(imports, members)
    };
    if converter.was_cancelled() {
        return Err(UnitError::Cancelled);
    }

    let (ctx, outcomes) = converter.into_parts();
    let extra_imports: IndexSet<String> = ctx
        .extra_imports
        .into_iter()
        .filter(|namespace| !imports.iter().any(|i| i.alias.is_none() && i.name == *namespace))
        .collect();
    let root = merge_imports(root_node, &extra_imports);
    let unit = ConvertedUnit {
        root,
        extra_imports,
        diagnostics: ctx.diagnostics,
        members: outcomes,
    };
    debug!(stats = ?unit.stats(), "unit converted");
    Ok(unit)
}

/// Append a `using` for each extra import after the unit's own.
fn merge_imports(root: CsNode, extra_imports: &IndexSet<String>) -> CsNode {
    let CsNode::CompilationUnit { mut usings, members } = root else {
        return root;
    };
    for namespace in extra_imports {
        let present = usings.iter().any(|using| {
            matches!(using, CsNode::UsingDirective { alias: None, name } if name == namespace)
        });
        if !present {
            usings.push(CsNode::UsingDirective {
                alias: None,
                name: namespace.clone(),
            });
        }
    }
    CsNode::CompilationUnit { usings, members }
}

#[cfg(test)]
#[path = "../tests/driver.rs"]
mod tests;
