//! WordprocessingML scanner built on regular expressions.

use std::ops::Range;

use regex::Regex;

use super::MarkupScanner;
use crate::model::{ParagraphFragment, Run, TextNode};

/// Scanner for `<w:p>`, `<w:r>` and `<w:t>` markup.
///
/// Opening tags are matched by exact element name, so `<w:pPr>`, `<w:rPr>`,
/// `<w:tab/>` and friends are never mistaken for paragraphs, runs or text
/// nodes. Self-closing elements (`<w:p/>`, `<w:t/>`) carry no content and are
/// skipped.
///
/// Paragraphs and runs are matched by counting start and end tags, so a
/// paragraph inside a text box (`<w:txbxContent>`) is its own fragment and
/// its runs and text nodes are left out of the enclosing paragraph.
#[derive(Debug, Clone)]
pub struct WordScanner {
    paragraph_token: Regex,
    run_token: Regex,
    text_regex: Regex,
}

/// A `<w:p>` whose end tag has not been seen yet.
struct OpenParagraph {
    start: usize,
    nested: Vec<Range<usize>>,
}

enum Token {
    Open,
    Close,
    Empty,
}

fn classify(tag: &str) -> Token {
    if tag.starts_with("</") {
        Token::Close
    } else if tag.ends_with("/>") {
        Token::Empty
    } else {
        Token::Open
    }
}

fn inside(ranges: &[Range<usize>], pos: usize) -> bool {
    ranges.iter().any(|r| r.contains(&pos))
}

impl WordScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self {
            paragraph_token: Regex::new(r"<w:p(?:\s[^>]*)?>|</w:p>").unwrap(),
            run_token: Regex::new(r"<w:r(?:\s[^>]*)?>|</w:r>").unwrap(),
            text_regex: Regex::new(r"(<w:t(?:\s(?:[^>]*[^/>])?)?>)([^<]*)</w:t>").unwrap(),
        }
    }

    /// Text nodes within `range`, minus those inside `excluded`.
    fn text_nodes_in(&self, xml: &str, range: &Range<usize>, excluded: &[Range<usize>]) -> Vec<TextNode> {
        self.text_regex
            .captures_iter(&xml[range.clone()])
            .filter_map(|caps| {
                let open = caps.get(1)?;
                let content = caps.get(2)?;
                Some(TextNode::new(open.range(), content.range()).shifted(range.start))
            })
            .filter(|node| !inside(excluded, node.open.start))
            .collect()
    }

    /// Top-level runs of a paragraph, skipping nested paragraphs.
    fn runs_in(&self, xml: &str, span: &Range<usize>, nested: &[Range<usize>]) -> Vec<Run> {
        let mut runs = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;

        for token in self.run_token.find_iter(&xml[span.clone()]) {
            let pos = token.start() + span.start;
            if inside(nested, pos) {
                continue;
            }
            match classify(token.as_str()) {
                Token::Open => {
                    if depth == 0 {
                        start = pos;
                    }
                    depth += 1;
                }
                Token::Close if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        let run_span = start..token.end() + span.start;
                        let nodes = self.text_nodes_in(xml, &run_span, nested);
                        runs.push(Run::new(run_span, nodes));
                    }
                }
                _ => {}
            }
        }

        runs
    }
}

impl Default for WordScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupScanner for WordScanner {
    fn name(&self) -> &str {
        "wordprocessingml"
    }

    fn paragraphs(&self, xml: &str) -> Vec<ParagraphFragment> {
        let mut open: Vec<OpenParagraph> = Vec::new();
        let mut fragments = Vec::new();

        for token in self.paragraph_token.find_iter(xml) {
            match classify(token.as_str()) {
                Token::Open => open.push(OpenParagraph {
                    start: token.start(),
                    nested: Vec::new(),
                }),
                Token::Close => {
                    // A stray end tag closes nothing.
                    let Some(paragraph) = open.pop() else {
                        continue;
                    };
                    let span = paragraph.start..token.end();
                    let runs = self.runs_in(xml, &span, &paragraph.nested);
                    fragments.push(
                        ParagraphFragment::new(span.clone(), runs).with_nested(paragraph.nested),
                    );
                    if let Some(parent) = open.last_mut() {
                        parent.nested.push(span);
                    }
                }
                Token::Empty => {}
            }
        }

        fragments.sort_by_key(|p| p.span.start);
        fragments
    }

    fn text_nodes(&self, xml: &str) -> Vec<TextNode> {
        self.text_nodes_in(xml, &(0..xml.len()), &[])
    }
}
