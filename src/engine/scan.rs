//! Tag extraction.

use super::report::{EntryTags, ExtractionReport};
use super::TemplateEngine;
use crate::container::Container;
use crate::error::Result;
use crate::markup::unescape_text;
use crate::model::TagSet;

impl TemplateEngine {
    /// Extract every tag name from the qualifying entries of a container.
    ///
    /// An empty set is a valid result: the template simply has no tags.
    pub fn extract_tags(&self, container: &mut Container) -> Result<TagSet> {
        Ok(self.scan_entries(container)?.tags())
    }

    /// Extract tags entry by entry.
    pub fn scan_entries(&self, container: &mut Container) -> Result<ExtractionReport> {
        let (entries, skipped_entries) = self.textual_entries(container)?;

        let entries = entries
            .into_iter()
            .map(|(info, xml)| {
                let tags = self.extract_tags_from_xml(&xml);
                log::debug!("Scanned {}: {} tags", info.name, tags.len());
                EntryTags {
                    name: info.name,
                    kind: info.kind,
                    tags,
                }
            })
            .collect();

        Ok(ExtractionReport {
            entries,
            skipped_entries,
        })
    }

    /// Extract tag names from one entry's markup.
    ///
    /// Each paragraph is stripped of markup and scanned, which catches tags
    /// split across runs. Paragraphs nested in text boxes are scanned on
    /// their own. A second pass scans the text of every text node in
    /// the entry joined together, for producers that do not emit paragraph
    /// markers where expected.
    pub fn extract_tags_from_xml(&self, xml: &str) -> TagSet {
        let mut tags = TagSet::new();

        for paragraph in self.scanner.paragraphs(xml) {
            let text = self.scanner.plain_text(&paragraph.own_markup(xml));
            self.collect_tags(&text, &mut tags);
        }

        let joined: String = self
            .scanner
            .text_nodes(xml)
            .iter()
            .map(|node| node.text(xml))
            .collect();
        self.collect_tags(&joined, &mut tags);

        tags
    }

    fn collect_tags(&self, text: &str, tags: &mut TagSet) {
        if !text.contains("{{") {
            return;
        }
        for caps in self.tag_regex.captures_iter(text) {
            tags.insert(&unescape_text(&caps[1]));
        }
    }
}
