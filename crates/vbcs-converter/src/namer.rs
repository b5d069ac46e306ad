//! Collision-free names for synthesized identifiers.
//!
//! The registry is a stack of scopes holding every name the converter has
//! synthesized so far. A candidate is accepted only when it is absent from
//! the registry and from the names the semantic model reports as visible at
//! the insertion point. Comparison is case-insensitive because the source
//! dialect is.

use tracing::trace;
use vbcs_common::{NameKey, NameSet, name_set};
use vbcs_common::limits::MAX_UNIQUE_NAME_ATTEMPTS;

#[derive(Debug, Clone)]
pub struct NameRegistry {
    scopes: Vec<NameSet>,
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NameRegistry {
    /// Registry with a single root scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![NameSet::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(NameSet::default());
    }

    /// Pop the innermost scope. The root scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Record a name in the innermost scope.
    pub fn reserve(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(NameKey::new(name));
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        let key = NameKey::new(name);
        self.scopes.iter().any(|scope| scope.contains(&key))
    }

    /// Synthesize a name starting from `base`: `base`, `base1`, `base2`, ...
    ///
    /// The first candidate neither reserved nor in `visible` wins and is
    /// reserved in the innermost scope.
    pub fn unique_name(&mut self, base: &str, visible: &[String]) -> String {
        let visible = name_set(visible.iter().map(String::as_str));
        let mut candidate = base.to_string();
        let mut counter = 0u32;
        while visible.contains(&NameKey::new(&candidate)) || self.is_reserved(&candidate) {
            counter += 1;
            if counter >= MAX_UNIQUE_NAME_ATTEMPTS {
                break;
            }
            candidate = format!("{base}{counter}");
        }
        trace!(base, name = %candidate, "synthesized name");
        self.reserve(&candidate);
        candidate
    }
}

#[cfg(test)]
#[path = "../tests/namer.rs"]
mod tests;
