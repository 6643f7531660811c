//! Model types shared by the scanner and the substitution engine.
//!
//! Fragments describe where paragraphs, runs and text nodes sit inside an
//! entry's markup; tag sets and value maps carry what is extracted from, and
//! written back into, a template.

mod fragment;
mod tag;
mod values;

pub use fragment::{ParagraphFragment, Run, TextNode};
pub use tag::{normalize_tag_name, TagSet, TAG_PATTERN};
pub use values::ValueMap;
