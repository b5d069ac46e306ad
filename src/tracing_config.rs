//! Tracing configuration for following a conversion.
//!
//! Three output formats, selected by `VBCS_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: hierarchical output via `tracing-tree`, one level per unit,
//!   member and statement span
//! - `json`: one JSON object per span/event
//!
//! ## Quick start
//!
//! ```bash
//! # Member-by-member tree
//! VBCS_LOG=debug VBCS_LOG_FORMAT=tree <host>
//!
//! # Per-node rewrite decisions of the statement rewriter only
//! VBCS_LOG="vbcs_converter::converter::statements=trace" <host>
//! ```
//!
//! Nothing is installed unless `VBCS_LOG` or `RUST_LOG` is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

pub const LOG_ENV: &str = "VBCS_LOG";
pub const LOG_FORMAT_ENV: &str = "VBCS_LOG_FORMAT";

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Unknown names fall back to `Text`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var(LOG_FORMAT_ENV).unwrap_or_default())
    }
}

/// `VBCS_LOG` wins over `RUST_LOG`; both take `RUST_LOG` syntax.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var(LOG_ENV) {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Install the global subscriber. Output goes to stderr.
///
/// Returns without installing anything when neither `VBCS_LOG` nor
/// `RUST_LOG` is set, or when a subscriber is already in place.
pub fn init_tracing() {
    if std::env::var(LOG_ENV).is_err() && std::env::var("RUST_LOG").is_err() {
        return;
    }

    let filter = build_filter();
    // Hosts and test harnesses may have installed their own.
    let installed = match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).try_init().is_ok()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).try_init().is_ok()
        }
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    };
    if installed {
        tracing::debug!(format = ?LogFormat::from_env(), "tracing initialised");
    }
}
