//! Markup segments and the final render output.

use serde::{Deserialize, Serialize};

use crate::config::{HIGHLIGHT_CLASS, HIGHLIGHT_TAG};

// =============================================================================
// Markup Segments
// =============================================================================

/// A slice of sanitized markup: either one complete tag or the text between tags.
///
/// Concatenating the slices of a decomposition reproduces the input exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkupSegment<'a> {
    /// Opaque start, end, or self-closing tag, `<` through `>`
    Tag(&'a str),
    /// Matchable text strictly between tags (may contain character references)
    Text(&'a str),
}

impl<'a> MarkupSegment<'a> {
    /// Raw markup of this segment.
    pub fn as_str(&self) -> &'a str {
        match self {
            Self::Tag(raw) | Self::Text(raw) => raw,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

// =============================================================================
// Final Markup
// =============================================================================

/// One piece of rendered output.
///
/// `Text` and `Highlighted` content is still markup-escaped (`&amp;`, `&lt;`);
/// use [`FinalMarkup::plain_text`] or [`decode_entities`] for display surfaces
/// that do not understand HTML.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "camelCase")]
pub enum Fragment {
    /// Ordinary text
    Text(String),
    /// Text matched by a highlight term
    Highlighted(String),
    /// Sanitized tag passed through unchanged
    RawTag(String),
}

impl Fragment {
    pub fn content(&self) -> &str {
        match self {
            Self::Text(s) | Self::Highlighted(s) | Self::RawTag(s) => s,
        }
    }
}

impl From<MarkupSegment<'_>> for Fragment {
    fn from(segment: MarkupSegment<'_>) -> Self {
        match segment {
            MarkupSegment::Tag(raw) => Self::RawTag(raw.to_string()),
            MarkupSegment::Text(raw) => Self::Text(raw.to_string()),
        }
    }
}

/// Render result of a single card: an ordered fragment sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinalMarkup {
    fragments: Vec<Fragment>,
}

/// Tags whose boundary starts a new line in plain-text output.
const LINE_BREAK_TAGS: &[&str] = &[
    "p", "br", "li", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "tr",
];

impl FinalMarkup {
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn into_fragments(self) -> Vec<Fragment> {
        self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Number of highlighted spans.
    pub fn highlight_count(&self) -> usize {
        self.fragments
            .iter()
            .filter(|f| matches!(f, Fragment::Highlighted(_)))
            .count()
    }

    /// Serialize to an HTML fragment.
    ///
    /// Highlighted spans are wrapped in the highlight marker element.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Text(text) | Fragment::RawTag(text) => html.push_str(text),
                Fragment::Highlighted(text) => {
                    html.push_str(&highlight_open_tag());
                    html.push_str(text);
                    html.push_str(&highlight_close_tag());
                }
            }
        }
        html
    }

    /// Visible text with tags dropped and character references decoded.
    ///
    /// Closing block tags and `<br>` become line breaks.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Text(text) | Fragment::Highlighted(text) => {
                    out.push_str(&decode_entities(text))
                }
                Fragment::RawTag(tag) => {
                    if breaks_line(tag) && !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                }
            }
        }
        out.trim_end().to_string()
    }
}

impl From<Vec<Fragment>> for FinalMarkup {
    fn from(fragments: Vec<Fragment>) -> Self {
        Self::new(fragments)
    }
}

/// Opening tag of the highlight marker element.
pub fn highlight_open_tag() -> String {
    format!("<{} class=\"{}\">", HIGHLIGHT_TAG, HIGHLIGHT_CLASS)
}

/// Closing tag of the highlight marker element.
pub fn highlight_close_tag() -> String {
    format!("</{}>", HIGHLIGHT_TAG)
}

fn breaks_line(tag: &str) -> bool {
    let name = tag_name(tag);
    let closing = tag.starts_with("</");
    (closing || name == "br") && LINE_BREAK_TAGS.contains(&name.as_str())
}

/// Lowercase element name of a raw tag such as `</P>` or `<a href="...">`.
pub fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Decode the character references a sanitizer emits in text content.
///
/// Unknown named references are left as they are.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_reference(&rest[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
