//! Paragraph, run and text-node spans over an entry's markup.
//!
//! Fragments never own text. They record byte ranges into the entry they were
//! scanned from, so a rewrite can splice new content in while leaving every
//! other byte of the markup untouched.

use std::borrow::Cow;
use std::ops::Range;

/// A `<w:t>` element carrying a run's text payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    /// Span of the opening tag, e.g. `<w:t xml:space="preserve">`
    pub open: Range<usize>,

    /// Span of the text between the opening and closing tags
    pub content: Range<usize>,
}

impl TextNode {
    /// Create a text node from its opening-tag and content spans.
    pub fn new(open: Range<usize>, content: Range<usize>) -> Self {
        Self { open, content }
    }

    /// The raw (still entity-escaped) text payload.
    pub fn text<'a>(&self, xml: &'a str) -> &'a str {
        &xml[self.content.clone()]
    }

    /// The opening tag markup.
    pub fn open_tag<'a>(&self, xml: &'a str) -> &'a str {
        &xml[self.open.clone()]
    }

    /// Whether the opening tag already declares `xml:space`.
    pub fn declares_space(&self, xml: &str) -> bool {
        self.open_tag(xml).contains("xml:space")
    }

    /// Shift all spans by `offset` bytes.
    pub fn shifted(&self, offset: usize) -> Self {
        Self {
            open: self.open.start + offset..self.open.end + offset,
            content: self.content.start + offset..self.content.end + offset,
        }
    }
}

/// A `<w:r>` element: the smallest styled unit of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Span of the whole run element
    pub span: Range<usize>,

    /// Text nodes inside the run, in document order
    pub text_nodes: Vec<TextNode>,
}

impl Run {
    /// Create a run.
    pub fn new(span: Range<usize>, text_nodes: Vec<TextNode>) -> Self {
        Self { span, text_nodes }
    }

    /// Whether the run carries at least one text node.
    pub fn is_text_bearing(&self) -> bool {
        !self.text_nodes.is_empty()
    }

    /// Concatenated raw text of the run.
    pub fn text(&self, xml: &str) -> String {
        self.text_nodes.iter().map(|t| t.text(xml)).collect()
    }
}

/// The markup span between a paragraph's start and end markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphFragment {
    /// Span of the whole paragraph element
    pub span: Range<usize>,

    /// Runs in document order
    pub runs: Vec<Run>,

    /// Spans of paragraphs nested inside this one (text boxes), which are
    /// fragments of their own
    pub nested: Vec<Range<usize>>,
}

impl ParagraphFragment {
    /// Create a paragraph fragment.
    pub fn new(span: Range<usize>, runs: Vec<Run>) -> Self {
        Self {
            span,
            runs,
            nested: Vec::new(),
        }
    }

    /// Record the spans of nested paragraphs.
    pub fn with_nested(mut self, nested: Vec<Range<usize>>) -> Self {
        self.nested = nested;
        self
    }

    /// The paragraph markup, nested paragraphs included.
    pub fn markup<'a>(&self, xml: &'a str) -> &'a str {
        &xml[self.span.clone()]
    }

    /// The paragraph markup with nested paragraphs cut out.
    pub fn own_markup<'a>(&self, xml: &'a str) -> Cow<'a, str> {
        if self.nested.is_empty() {
            return Cow::Borrowed(self.markup(xml));
        }

        let mut out = String::with_capacity(self.span.len());
        let mut cursor = self.span.start;
        for inner in &self.nested {
            out.push_str(&xml[cursor..inner.start]);
            cursor = inner.end;
        }
        out.push_str(&xml[cursor..self.span.end]);
        Cow::Owned(out)
    }

    /// Iterate over every text node of every run, in document order.
    pub fn text_nodes(&self) -> impl Iterator<Item = &TextNode> {
        self.runs.iter().flat_map(|r| r.text_nodes.iter())
    }

    /// Runs that carry a text node.
    pub fn text_runs(&self) -> impl Iterator<Item = &Run> {
        self.runs.iter().filter(|r| r.is_text_bearing())
    }

    /// Reconstruct the paragraph's raw text from its text nodes.
    pub fn text(&self, xml: &str) -> String {
        self.text_nodes().map(|t| t.text(xml)).collect()
    }

    /// Check if the paragraph holds no text node.
    pub fn is_empty(&self) -> bool {
        self.text_nodes().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<w:p><w:r><w:t>Hola </w:t></w:r><w:r><w:t xml:space="preserve">mundo</w:t></w:r></w:p>"#;

    fn sample() -> ParagraphFragment {
        // Offsets computed against XML above.
        let first = TextNode::new(10..15, 15..20);
        let second = TextNode::new(37..63, 63..68);
        ParagraphFragment::new(
            0..XML.len(),
            vec![Run::new(5..32, vec![first]), Run::new(32..80, vec![second])],
        )
    }

    #[test]
    fn test_text_reconstruction() {
        let para = sample();
        assert_eq!(para.text(XML), "Hola mundo");
        assert!(!para.is_empty());
        assert_eq!(para.text_runs().count(), 2);
    }

    #[test]
    fn test_text_node_accessors() {
        let para = sample();
        let nodes: Vec<_> = para.text_nodes().collect();
        assert_eq!(nodes[0].open_tag(XML), "<w:t>");
        assert!(!nodes[0].declares_space(XML));
        assert!(nodes[1].declares_space(XML));
    }

    #[test]
    fn test_shifted() {
        let node = TextNode::new(0..5, 5..9).shifted(10);
        assert_eq!(node.open, 10..15);
        assert_eq!(node.content, 15..19);
    }

    #[test]
    fn test_own_markup_skips_nested() {
        let xml = "<w:p>A<w:p>B</w:p>C<w:p>D</w:p>E</w:p>";
        let para = ParagraphFragment::new(0..xml.len(), Vec::new()).with_nested(vec![6..18, 19..31]);
        assert_eq!(para.own_markup(xml), "<w:p>ACE</w:p>");
        assert_eq!(para.markup(xml), xml);

        let plain = ParagraphFragment::new(6..18, Vec::new());
        assert!(matches!(plain.own_markup(xml), Cow::Borrowed("<w:p>B</w:p>")));
    }

    #[test]
    fn test_empty_paragraph() {
        let para = ParagraphFragment::new(0..12, vec![Run::new(5..6, Vec::new())]);
        assert!(para.is_empty());
        assert_eq!(para.text_runs().count(), 0);
    }
}
