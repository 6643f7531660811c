//! Extraction and substitution reports, with JSON output.

use serde::{Deserialize, Serialize};

use crate::container::EntryKind;
use crate::error::{Error, Result};
use crate::model::TagSet;

/// Tags found in one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryTags {
    /// Entry name
    pub name: String,

    /// Entry kind
    pub kind: EntryKind,

    /// Tags found in the entry
    pub tags: TagSet,
}

/// Per-entry result of scanning a template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Scanned entries, in archive order
    pub entries: Vec<EntryTags>,

    /// Entries skipped because they could not be decoded (lenient mode)
    pub skipped_entries: Vec<String>,
}

impl ExtractionReport {
    /// Union of the tags of every entry.
    pub fn tags(&self) -> TagSet {
        let mut all = TagSet::new();
        for entry in &self.entries {
            all.merge(&entry.tags);
        }
        all
    }

    /// Number of entries scanned.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

/// Counters for a single rewritten entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStats {
    /// Paragraphs whose text was rewritten
    pub paragraphs_rewritten: u32,

    /// Tag occurrences replaced by a value
    pub replacements: u32,

    /// Tags that had no value
    pub unresolved: TagSet,
}

impl EntryStats {
    /// Whether anything in the entry changed.
    pub fn is_modified(&self) -> bool {
        self.paragraphs_rewritten > 0
    }
}

/// Summary of a substitution run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubstitutionReport {
    /// Number of entries that qualified for rewriting
    pub qualifying_entries: u32,

    /// Entries whose content changed
    pub rewritten_entries: Vec<String>,

    /// Entries skipped because they could not be decoded (lenient mode)
    pub skipped_entries: Vec<String>,

    /// Paragraphs whose text was rewritten
    pub paragraphs_rewritten: u32,

    /// Tag occurrences replaced by a value
    pub replacements: u32,

    /// Tags found in rewritable paragraphs that had no value
    pub unresolved: TagSet,
}

impl SubstitutionReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one entry's counters into the report.
    pub fn record(&mut self, name: &str, stats: &EntryStats) {
        if stats.is_modified() {
            self.rewritten_entries.push(name.to_string());
        }
        self.paragraphs_rewritten += stats.paragraphs_rewritten;
        self.replacements += stats.replacements;
        self.unresolved.merge(&stats.unresolved);
    }

    /// Whether every tag encountered had a value.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Whether the output differs from the input.
    pub fn is_modified(&self) -> bool {
        !self.rewritten_entries.is_empty()
    }
}

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a tag set or report to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Other(format!("JSON serialization error: {}", e)))
}
