//! Tag substitution.

use std::ops::Range;

use regex::Captures;

use super::options::UnmatchedPolicy;
use super::report::{EntryStats, SubstitutionReport};
use super::TemplateEngine;
use crate::container::{Container, Replacements};
use crate::error::Result;
use crate::markup::{escape_text, unescape_text};
use crate::model::{ParagraphFragment, TagSet, TextNode, ValueMap};

/// Result of substituting a container: new entry content plus a report.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    /// Rewritten entries, ready for [`Container::write`]
    pub replacements: Replacements,

    /// What was replaced and what was left unresolved
    pub report: SubstitutionReport,
}

impl TemplateEngine {
    /// Substitute tag values in every qualifying entry of a container.
    ///
    /// The container itself is not modified; pass the returned replacements
    /// to [`Container::write`] to emit the filled document. Entries without
    /// any rewritten paragraph are not part of the replacements and are
    /// copied unchanged.
    pub fn substitute(&self, container: &mut Container, values: &ValueMap) -> Result<Substitution> {
        let (entries, skipped_entries) = self.textual_entries(container)?;

        let mut report = SubstitutionReport::new();
        report.qualifying_entries = (entries.len() + skipped_entries.len()) as u32;
        report.skipped_entries = skipped_entries;

        if report.qualifying_entries == 0 {
            log::warn!("Template has no textual entries; output is an unchanged copy");
        }

        let mut replacements = Replacements::new();
        for (info, xml) in entries {
            let (rewritten, stats) = self.substitute_xml(&xml, values);
            report.record(&info.name, &stats);
            if stats.is_modified() {
                log::debug!(
                    "Rewrote {}: {} paragraphs, {} replacements",
                    info.name,
                    stats.paragraphs_rewritten,
                    stats.replacements
                );
                replacements.insert(info.name, rewritten);
            }
        }

        if !report.unresolved.is_empty() {
            log::warn!("Tags without a value: {}", report.unresolved);
        }

        Ok(Substitution {
            replacements,
            report,
        })
    }

    /// Substitute tag values in one entry's markup.
    ///
    /// Paragraphs that contain no tag with a value are left byte-identical.
    pub fn substitute_xml(&self, xml: &str, values: &ValueMap) -> (String, EntryStats) {
        let mut stats = EntryStats::default();
        let mut edits = Vec::new();

        for paragraph in self.scanner.paragraphs(xml) {
            if let Some(text) = self.rewrite_paragraph(xml, &paragraph, values, &mut stats) {
                edits.extend(text_edits(xml, &paragraph, text));
            }
        }

        if !stats.is_modified() {
            return (xml.to_string(), stats);
        }

        (apply_edits(xml, edits), stats)
    }

    /// Substituted text of one paragraph, or `None` to keep it as is.
    fn rewrite_paragraph(
        &self,
        xml: &str,
        paragraph: &ParagraphFragment,
        values: &ValueMap,
        stats: &mut EntryStats,
    ) -> Option<String> {
        let text = paragraph.text(xml);
        if !text.contains("{{") {
            return None;
        }

        let mut replaced = 0u32;
        let mut unresolved = TagSet::new();
        let substituted = self.tag_regex.replace_all(&text, |caps: &Captures| {
            let name = unescape_text(&caps[1]);
            match values.get(&name) {
                Some(value) => {
                    replaced += 1;
                    if self.options.escape_values {
                        escape_text(value).into_owned()
                    } else {
                        value.to_string()
                    }
                }
                None => {
                    unresolved.insert(&name);
                    match self.options.unmatched {
                        UnmatchedPolicy::Keep => caps[0].to_string(),
                        UnmatchedPolicy::Blank => String::new(),
                    }
                }
            }
        });

        let rewrite = replaced > 0
            || (self.options.unmatched == UnmatchedPolicy::Blank && !unresolved.is_empty());
        stats.unresolved.merge(&unresolved);
        if !rewrite {
            return None;
        }

        stats.paragraphs_rewritten += 1;
        stats.replacements += replaced;
        Some(substituted.into_owned())
    }
}

/// Replacement of one byte range of an entry.
struct Edit {
    range: Range<usize>,
    text: String,
}

/// Edits that put `text` in the first text node of a paragraph and empty
/// every later one, keeping run and formatting markup.
///
/// Edits only touch the paragraph's own text nodes, so edits from different
/// paragraphs never overlap, nested ones included.
fn text_edits(xml: &str, paragraph: &ParagraphFragment, text: String) -> Vec<Edit> {
    let mut edits = Vec::new();

    for (index, node) in paragraph.text_nodes().enumerate() {
        if index > 0 {
            edits.push(Edit {
                range: node.content.clone(),
                text: String::new(),
            });
            continue;
        }
        if needs_space_preserve(node, xml, &text) {
            edits.push(Edit {
                range: node.open.clone(),
                text: with_space_preserve(node.open_tag(xml)),
            });
        }
        edits.push(Edit {
            range: node.content.clone(),
            text: text.clone(),
        });
    }

    edits
}

fn apply_edits(xml: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|e| e.range.start);

    let mut out = String::with_capacity(xml.len());
    let mut cursor = 0;
    for edit in &edits {
        out.push_str(&xml[cursor..edit.range.start]);
        out.push_str(&edit.text);
        cursor = edit.range.end;
    }
    out.push_str(&xml[cursor..]);
    out
}

fn needs_space_preserve(node: &TextNode, xml: &str, text: &str) -> bool {
    !node.declares_space(xml)
        && (text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace))
}

fn with_space_preserve(open_tag: &str) -> String {
    let head = open_tag.strip_suffix('>').unwrap_or(open_tag).trim_end();
    format!("{} xml:space=\"preserve\">", head)
}
