//! Tag extraction and substitution over document containers.
//!
//! [`TemplateEngine`] is stateless between calls: it holds only options, the
//! markup scanner and a compiled tag pattern, and can be shared across
//! threads. Every operation works on a [`Container`] the caller opened.
//!
//! # Example
//!
//! ```no_run
//! use docfill::container::Container;
//! use docfill::engine::TemplateEngine;
//! use docfill::model::ValueMap;
//!
//! fn main() -> docfill::Result<()> {
//!     let engine = TemplateEngine::new();
//!     let mut container = Container::open("constancia.docx")?;
//!
//!     let tags = engine.extract_tags(&mut container)?;
//!     println!("Template needs: {}", tags);
//!
//!     let values: ValueMap = [("nombre", "Carlos Ruiz"), ("curso", "10mo A")]
//!         .into_iter()
//!         .collect();
//!     let result = engine.substitute(&mut container, &values)?;
//!     container.write("constancia_carlos.docx", &result.replacements)?;
//!     Ok(())
//! }
//! ```

mod options;
mod report;
mod scan;
mod substitute;

pub use options::{ErrorMode, TemplateOptions, UnmatchedPolicy};
pub use report::{
    to_json, EntryStats, EntryTags, ExtractionReport, JsonFormat, SubstitutionReport,
};
pub use substitute::Substitution;

use std::sync::Arc;

use regex::Regex;

use crate::container::{Container, EntryInfo};
use crate::error::{Error, Result};
use crate::markup::{MarkupScanner, WordScanner};
use crate::model::TAG_PATTERN;

/// Extracts and substitutes `{{tag}}` placeholders.
#[derive(Clone)]
pub struct TemplateEngine {
    options: TemplateOptions,
    scanner: Arc<dyn MarkupScanner>,
    tag_regex: Regex,
}

impl TemplateEngine {
    /// Create an engine with default options and the WordprocessingML scanner.
    pub fn new() -> Self {
        Self::with_options(TemplateOptions::default())
    }

    /// Create an engine with custom options.
    pub fn with_options(options: TemplateOptions) -> Self {
        Self {
            options,
            scanner: Arc::new(WordScanner::new()),
            tag_regex: Regex::new(TAG_PATTERN).unwrap(),
        }
    }

    /// Replace the markup scanner.
    pub fn with_scanner(mut self, scanner: Arc<dyn MarkupScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    /// Options in use.
    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    /// Markup scanner in use.
    pub fn scanner(&self) -> &dyn MarkupScanner {
        self.scanner.as_ref()
    }

    /// Read every qualifying entry as text.
    ///
    /// Returns the decoded entries and, in lenient mode, the names of entries
    /// that were skipped because they are not UTF-8.
    fn textual_entries(
        &self,
        container: &mut Container,
    ) -> Result<(Vec<(EntryInfo, String)>, Vec<String>)> {
        let qualifying: Vec<EntryInfo> = container
            .entries()
            .iter()
            .filter(|e| !e.is_dir() && self.options.qualifies(e))
            .cloned()
            .collect();

        let mut entries = Vec::with_capacity(qualifying.len());
        let mut skipped = Vec::new();
        for info in qualifying {
            match container.read_text_entry(&info.name) {
                Ok(xml) => entries.push((info, xml)),
                Err(e @ Error::Encoding(_)) => {
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("Skipping entry {}: {}", info.name, e);
                    skipped.push(info.name);
                }
                Err(e) => return Err(e),
            }
        }

        Ok((entries, skipped))
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("options", &self.options)
            .field("scanner", &self.scanner.name())
            .finish()
    }
}
