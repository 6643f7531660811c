//! # docfill
//!
//! Tag extraction and substitution for DOCX templates.
//!
//! Templates carry `{{tag}}` placeholders in their body, headers and footers.
//! This library lists those tags and fills them with values, producing a new
//! document while leaving every other part of the package untouched.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docfill::{extract_tags, substitute, ValueMap};
//!
//! fn main() -> docfill::Result<()> {
//!     // Which values does the template need?
//!     let tags = extract_tags("constancia.docx")?;
//!     println!("{}", tags);
//!
//!     // Fill them in
//!     let values: ValueMap = [("nombre", "Carlos Ruiz"), ("curso", "10mo A")]
//!         .into_iter()
//!         .collect();
//!     let report = substitute("constancia.docx", &values, "constancia_carlos.docx")?;
//!     if !report.is_complete() {
//!         eprintln!("No value for: {}", report.unresolved);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Split-run tolerance**: tags broken across runs by the word processor
//!   are found and replaced
//! - **Faithful output**: untouched entries are copied byte for byte
//! - **Atomic writes**: a failed fill never leaves a partial document
//! - **Pluggable scanning**: markup handling sits behind [`markup::MarkupScanner`]

pub mod container;
pub mod detect;
pub mod engine;
pub mod error;
pub mod markup;
pub mod model;

#[cfg(feature = "async")]
pub mod nonblocking;

// Re-export commonly used types
pub use container::{Compression, Container, DocumentKind, EntryInfo, EntryKind, Replacements};
pub use detect::{detect_container_from_bytes, detect_container_from_path, is_container};
pub use engine::{
    EntryStats, EntryTags, ErrorMode, ExtractionReport, JsonFormat, Substitution,
    SubstitutionReport, TemplateEngine, TemplateOptions, UnmatchedPolicy,
};
pub use error::{Error, Result};
pub use markup::{MarkupScanner, WordScanner};
pub use model::{ParagraphFragment, Run, TagSet, TextNode, ValueMap};

use std::path::Path;
use std::sync::Arc;

/// Extract the tags of a template file.
///
/// # Arguments
///
/// * `path` - Path to the template
///
/// # Returns
///
/// The sorted, deduplicated set of tag names. A template without tags yields
/// an empty set.
///
/// # Example
///
/// ```no_run
/// use docfill::extract_tags;
///
/// let tags = extract_tags("constancia.docx").unwrap();
/// for tag in &tags {
///     println!("{}", tag);
/// }
/// ```
pub fn extract_tags<P: AsRef<Path>>(path: P) -> Result<TagSet> {
    extract_tags_with_options(path, TemplateOptions::default())
}

/// Extract the tags of a template file with custom options.
///
/// # Example
///
/// ```no_run
/// use docfill::{extract_tags_with_options, TemplateOptions};
///
/// let options = TemplateOptions::new().lenient().with_notes(true);
/// let tags = extract_tags_with_options("constancia.docx", options).unwrap();
/// ```
pub fn extract_tags_with_options<P: AsRef<Path>>(
    path: P,
    options: TemplateOptions,
) -> Result<TagSet> {
    let mut container = Container::open(path)?;
    TemplateEngine::with_options(options).extract_tags(&mut container)
}

/// Extract the tags of a template held in memory.
pub fn extract_tags_from_bytes(data: &[u8]) -> Result<TagSet> {
    let mut container = Container::from_bytes(data)?;
    TemplateEngine::new().extract_tags(&mut container)
}

/// Fill a template and write the result to `output`.
///
/// Tags without a value are left in the output and listed in the returned
/// report. The output file is only created once the whole document has been
/// written.
///
/// # Example
///
/// ```no_run
/// use docfill::{substitute, ValueMap};
///
/// let values = ValueMap::from_json_str(r#"{"nombre": "Ana Pérez"}"#).unwrap();
/// let report = substitute("carta.docx", &values, "carta_ana.docx").unwrap();
/// println!("{} replacements", report.replacements);
/// ```
pub fn substitute<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    values: &ValueMap,
    output: Q,
) -> Result<SubstitutionReport> {
    substitute_with_options(path, values, output, TemplateOptions::default())
}

/// Fill a template with custom options.
pub fn substitute_with_options<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    values: &ValueMap,
    output: Q,
    options: TemplateOptions,
) -> Result<SubstitutionReport> {
    let mut container = Container::open(path)?;
    let result = TemplateEngine::with_options(options).substitute(&mut container, values)?;
    container.write(output, &result.replacements)?;
    Ok(result.report)
}

/// Fill a template held in memory, returning the new document bytes.
pub fn substitute_bytes(data: &[u8], values: &ValueMap) -> Result<(Vec<u8>, SubstitutionReport)> {
    let mut container = Container::from_bytes(data)?;
    let result = TemplateEngine::new().substitute(&mut container, values)?;
    let bytes = container.to_bytes(&result.replacements)?;
    Ok((bytes, result.report))
}

/// Builder for opening templates.
///
/// # Example
///
/// ```no_run
/// use docfill::{Docfill, ValueMap};
///
/// let mut template = Docfill::new()
///     .lenient()
///     .with_notes(true)
///     .open("boletin.docx")?;
///
/// let tags = template.tags()?;
/// let values: ValueMap = tags.iter().map(|t| (t.clone(), "-".to_string())).collect();
/// template.fill(&values, "boletin_final.docx")?;
/// # Ok::<(), docfill::Error>(())
/// ```
pub struct Docfill {
    options: TemplateOptions,
    scanner: Option<Arc<dyn MarkupScanner>>,
}

impl Docfill {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            options: TemplateOptions::default(),
            scanner: None,
        }
    }

    /// Skip textual entries that are not valid UTF-8.
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Remove tags that have no value.
    pub fn blank_unmatched(mut self) -> Self {
        self.options = self.options.blank_unmatched();
        self
    }

    /// Insert values without XML escaping.
    pub fn raw_values(mut self) -> Self {
        self.options = self.options.raw_values();
        self
    }

    /// Include footnotes and endnotes.
    pub fn with_notes(mut self, include: bool) -> Self {
        self.options = self.options.with_notes(include);
        self
    }

    /// Treat an additional entry as textual.
    pub fn with_entry(mut self, name: impl Into<String>) -> Self {
        self.options = self.options.with_entry(name);
        self
    }

    /// Use a custom markup scanner.
    pub fn with_scanner(mut self, scanner: Arc<dyn MarkupScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    fn engine(self) -> TemplateEngine {
        let engine = TemplateEngine::with_options(self.options);
        match self.scanner {
            Some(scanner) => engine.with_scanner(scanner),
            None => engine,
        }
    }

    /// Open a template file.
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<Template> {
        let container = Container::open(path)?;
        Ok(Template {
            container,
            engine: self.engine(),
        })
    }

    /// Open a template held in memory.
    pub fn open_bytes(self, data: &[u8]) -> Result<Template> {
        let container = Container::from_bytes(data)?;
        Ok(Template {
            container,
            engine: self.engine(),
        })
    }
}

impl Default for Docfill {
    fn default() -> Self {
        Self::new()
    }
}

/// An opened template.
pub struct Template {
    container: Container,
    engine: TemplateEngine,
}

impl Template {
    /// Tags used by the template.
    pub fn tags(&mut self) -> Result<TagSet> {
        self.engine.extract_tags(&mut self.container)
    }

    /// Tags used by the template, entry by entry.
    pub fn scan(&mut self) -> Result<ExtractionReport> {
        self.engine.scan_entries(&mut self.container)
    }

    /// Fill the template and write the result to `output`.
    ///
    /// The template can be filled any number of times.
    pub fn fill<P: AsRef<Path>>(&mut self, values: &ValueMap, output: P) -> Result<SubstitutionReport> {
        let result = self.engine.substitute(&mut self.container, values)?;
        self.container.write(output, &result.replacements)?;
        Ok(result.report)
    }

    /// Fill the template in memory.
    pub fn fill_to_bytes(&mut self, values: &ValueMap) -> Result<(Vec<u8>, SubstitutionReport)> {
        let result = self.engine.substitute(&mut self.container, values)?;
        let bytes = self.container.to_bytes(&result.replacements)?;
        Ok((bytes, result.report))
    }

    /// The underlying container.
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// The engine used for this template.
    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }
}
