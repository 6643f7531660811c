//! Textual markup normalization.
//!
//! Nothing here builds a tree. Markup is treated as text: tags are cut out and
//! what remains is the human-readable content.

use std::borrow::Cow;

/// Remove every `<...>` span from a markup fragment.
///
/// Remaining text is concatenated with no separator. A `<` that is never
/// closed, or that is followed by another `<` before any `>`, is kept as
/// literal text, as is a stray `>`.
///
/// # Example
///
/// ```
/// use docfill::markup::strip_tags;
///
/// let text = strip_tags("<w:r><w:t>{{stu</w:t></w:r><w:r><w:t>dent}}</w:t></w:r>");
/// assert_eq!(text, "{{student}}");
/// ```
pub fn strip_tags(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut rest = fragment;

    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        let after = &rest[lt + 1..];
        match after.find(&['<', '>'][..]) {
            Some(pos) if after.as_bytes()[pos] == b'>' => {
                rest = &after[pos + 1..];
            }
            _ => {
                out.push('<');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape text for use as XML character data.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    if !text.contains(&['&', '<', '>'][..]) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Decode predefined XML entities and numeric character references.
///
/// Unknown or malformed references are left as they are.
pub fn unescape_text(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&after[..semi]).map(|ch| (ch, semi)));

        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or(name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)
        }
    }
}
