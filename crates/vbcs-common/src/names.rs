//! Identifier comparison for the source dialect.
//!
//! Source identifiers are case-insensitive, so every set of names the
//! converter keeps (visible names, synthesized names) is keyed by a folded
//! form. Target identifiers keep the spelling of their declaration.

use rustc_hash::FxHashSet;
use std::borrow::Borrow;

/// Case-folded identifier key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameKey(String);

impl NameKey {
    pub fn new(name: &str) -> Self {
        // Escaped identifiers ([Select]) compare by their inner text.
        let trimmed = name.trim_start_matches('[').trim_end_matches(']');
        Self(trimmed.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NameKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for NameKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Set of source identifiers, case-insensitive.
pub type NameSet = FxHashSet<NameKey>;

/// Fold `names` into a `NameSet`.
pub fn name_set<'n>(names: impl IntoIterator<Item = &'n str>) -> NameSet {
    names.into_iter().map(NameKey::new).collect()
}

/// Compare two source identifiers.
#[inline]
pub fn names_equal(a: &str, b: &str) -> bool {
    NameKey::new(a) == NameKey::new(b)
}

/// Capitalize the first character (used for synthesized names such as
/// `argValue` from a parameter called `value`).
pub fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case the first character.
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "../tests/names.rs"]
mod tests;
