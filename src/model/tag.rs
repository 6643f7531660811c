//! Tag names and tag sets.

use serde::{Deserialize, Serialize};
use std::collections::btree_set;
use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;

/// Pattern matching one `{{name}}` placeholder; group 1 is the raw name.
pub const TAG_PATTERN: &str = r"\{\{([^}]*)\}\}";

/// Normalize a tag name for lookups.
///
/// Trims surrounding whitespace, applies Unicode NFC and lowercases, so that
/// `{{ Nombre }}` and `nombre` compare equal.
pub fn normalize_tag_name(name: &str) -> String {
    name.trim().nfc().collect::<String>().to_lowercase()
}

/// A deduplicated, sorted set of tag names.
///
/// Names are stored as written in the template (trimmed, entities decoded);
/// extraction is case-sensitive, so `{{Nombre}}` and `{{nombre}}` are two
/// entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet {
    names: BTreeSet<String>,
}

impl TagSet {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag name. Whitespace is trimmed and empty names are ignored.
    ///
    /// Returns `true` if the name was not already present.
    pub fn insert(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.names.insert(name.to_string())
    }

    /// Check whether a tag name is present (exact match).
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name.trim())
    }

    /// Merge another set into this one.
    pub fn merge(&mut self, other: &TagSet) {
        self.names.extend(other.names.iter().cloned());
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over tag names in sorted order.
    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.names.iter()
    }

    /// Consume the set into a sorted vector.
    pub fn into_vec(self) -> Vec<String> {
        self.names.into_iter().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for name in iter {
            set.insert(name.as_ref());
        }
        set
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

impl IntoIterator for TagSet {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.into_iter()
    }
}

impl std::fmt::Display for TagSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.names.iter().map(|s| s.as_str()).collect();
        write!(f, "{}", names.join(", "))
    }
}
