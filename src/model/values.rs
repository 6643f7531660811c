//! Tag-to-value mappings supplied by the caller.

use super::tag::normalize_tag_name;
use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;

/// Mapping from tag name to replacement text.
///
/// Keys are matched whitespace-tolerantly and case-insensitively: inserting
/// `"Nombre"` makes `{{nombre}}`, `{{ NOMBRE }}` and `{{Nombre}}` resolve to the
/// same value. Inserting two keys that normalize alike keeps the last value.
#[derive(Debug, Clone, Default)]
pub struct ValueMap {
    entries: HashMap<String, (String, String)>,
}

impl ValueMap {
    /// Create an empty value map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value for a tag name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries
            .insert(normalize_tag_name(&name), (name, value.into()));
    }

    /// Look up the value for a tag name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&normalize_tag_name(name))
            .map(|(_, value)| value.as_str())
    }

    /// Check whether a tag name has a value.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_tag_name(name))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys as they were inserted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|(name, _)| name.as_str())
    }

    /// Build a value map from a JSON object.
    ///
    /// Strings are used verbatim, numbers and booleans are rendered as text
    /// and `null` becomes an empty string. Arrays and nested objects are
    /// rejected.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::InvalidValues("expected a JSON object".into()))?;

        let mut map = Self::new();
        for (key, value) in object {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(Error::InvalidValues(format!(
                        "value for '{}' must be a scalar",
                        key
                    )));
                }
            };
            map.insert(key.clone(), text);
        }
        Ok(map)
    }

    /// Parse a value map from a JSON object string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl From<HashMap<String, String>> for ValueMap {
    fn from(values: HashMap<String, String>) -> Self {
        values.into_iter().collect()
    }
}
