//! Template processing options.

use crate::container::{EntryInfo, EntryKind};

/// Options for extracting and substituting tags.
#[derive(Debug, Clone)]
pub struct TemplateOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// What to do with tags that have no value
    pub unmatched: UnmatchedPolicy,

    /// Whether to XML-escape replacement values
    pub escape_values: bool,

    /// Whether footnotes and endnotes are scanned and rewritten
    pub include_notes: bool,

    /// Additional entries to treat as textual, by exact name
    pub extra_entries: Vec<String>,
}

impl TemplateOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip textual entries that cannot be decoded).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set the policy for tags without a value.
    pub fn with_unmatched(mut self, policy: UnmatchedPolicy) -> Self {
        self.unmatched = policy;
        self
    }

    /// Remove tags that have no value instead of keeping them.
    pub fn blank_unmatched(mut self) -> Self {
        self.unmatched = UnmatchedPolicy::Blank;
        self
    }

    /// Enable or disable XML escaping of values.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_values = escape;
        self
    }

    /// Insert values verbatim; the caller supplies valid markup text.
    pub fn raw_values(mut self) -> Self {
        self.escape_values = false;
        self
    }

    /// Enable or disable footnotes and endnotes.
    pub fn with_notes(mut self, include: bool) -> Self {
        self.include_notes = include;
        self
    }

    /// Treat an additional entry as textual.
    pub fn with_entry(mut self, name: impl Into<String>) -> Self {
        self.extra_entries.push(name.into());
        self
    }

    /// Whether an entry is scanned and rewritten under these options.
    pub fn qualifies(&self, entry: &EntryInfo) -> bool {
        if self.extra_entries.iter().any(|name| *name == entry.name) {
            return true;
        }
        match entry.kind {
            EntryKind::Body | EntryKind::Header | EntryKind::Footer => true,
            EntryKind::Notes => self.include_notes,
            EntryKind::Other => false,
        }
    }
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            unmatched: UnmatchedPolicy::Keep,
            escape_values: true,
            include_notes: false,
            extra_entries: Vec::new(),
        }
    }
}

/// Error handling mode for textual entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail when a textual entry is not valid UTF-8
    #[default]
    Strict,
    /// Skip such entries and continue
    Lenient,
}

/// What happens to a `{{tag}}` with no value in the value map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedPolicy {
    /// Leave the tag text in place
    #[default]
    Keep,
    /// Remove the tag text
    Blank,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Compression;

    fn entry(name: &str) -> EntryInfo {
        EntryInfo {
            name: name.to_string(),
            compression: Compression::Deflated,
            size: 0,
            compressed_size: 0,
            kind: EntryKind::classify(name),
            method: zip::CompressionMethod::Deflated,
        }
    }

    #[test]
    fn test_template_options_builder() {
        let options = TemplateOptions::new()
            .lenient()
            .blank_unmatched()
            .raw_values()
            .with_notes(true)
            .with_entry("word/glossary/document.xml");

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.unmatched, UnmatchedPolicy::Blank);
        assert!(!options.escape_values);
        assert!(options.include_notes);
        assert_eq!(options.extra_entries, vec!["word/glossary/document.xml"]);
    }

    #[test]
    fn test_default_options() {
        let options = TemplateOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.unmatched, UnmatchedPolicy::Keep);
        assert!(options.escape_values);
        assert!(!options.include_notes);
    }

    #[test]
    fn test_qualifying_entries() {
        let options = TemplateOptions::default();
        assert!(options.qualifies(&entry("word/document.xml")));
        assert!(options.qualifies(&entry("word/header2.xml")));
        assert!(options.qualifies(&entry("word/footer1.xml")));
        assert!(!options.qualifies(&entry("word/footnotes.xml")));
        assert!(!options.qualifies(&entry("word/styles.xml")));
        assert!(!options.qualifies(&entry("word/media/image1.png")));

        let options = options.with_notes(true).with_entry("word/styles.xml");
        assert!(options.qualifies(&entry("word/footnotes.xml")));
        assert!(options.qualifies(&entry("word/styles.xml")));
    }
}
