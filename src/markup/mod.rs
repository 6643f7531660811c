//! Markup scanning.
//!
//! Entries are treated as text, not parsed into a tree. The [`MarkupScanner`]
//! trait is the seam between that textual view and the tag scanner /
//! substitution engine, so a structural parser can be slotted in without
//! touching either.
//!
//! Known limitation of the textual approach: a literal `<` or `>` inside text
//! content (conforming producers always escape them) can confuse
//! [`strip_tags`].

mod normalize;
mod word;

pub use normalize::{escape_text, strip_tags, unescape_text};
pub use word::WordScanner;

use crate::model::{ParagraphFragment, TextNode};

/// Locates paragraphs, runs and text nodes in an entry's markup.
pub trait MarkupScanner: Send + Sync {
    /// Name of this scanner.
    fn name(&self) -> &str;

    /// Split an entry into paragraph fragments, in document order.
    fn paragraphs(&self, xml: &str) -> Vec<ParagraphFragment>;

    /// Every text node in the entry, ignoring paragraph boundaries.
    fn text_nodes(&self, xml: &str) -> Vec<TextNode>;

    /// Human-readable text of a markup fragment.
    fn plain_text(&self, fragment: &str) -> String {
        strip_tags(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plain_text() {
        let scanner = WordScanner::new();
        assert_eq!(scanner.name(), "wordprocessingml");
        assert_eq!(
            scanner.plain_text("<w:r><w:t>{{cur</w:t></w:r><w:r><w:t>so}}</w:t></w:r>"),
            "{{curso}}"
        );
    }
}
