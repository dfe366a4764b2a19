//! Markup decomposer.
//!
//! Splits sanitized markup into an ordered sequence of opaque tag runs and
//! matchable text runs. The input must already have passed the allow-list
//! sanitizer; the decomposer does not validate tags, it only finds their edges.
//!
//! Handles:
//! - Start, end, and self-closing tags (`<p>`, `</p>`, `<br />`)
//! - `>` inside quoted attribute values
//! - Unterminated tags (remainder becomes a trailing text run)

use crate::models::MarkupSegment;

// =============================================================================
// Lexer
// =============================================================================

/// Single-pass lexer over a markup string.
///
/// Yields borrowed segments; empty text runs are never produced.
pub struct MarkupLexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> MarkupLexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Collect all segments.
    pub fn tokenize(self) -> Vec<MarkupSegment<'a>> {
        self.collect()
    }

    fn read_text(&mut self) -> MarkupSegment<'a> {
        let start = self.pos;
        let end = self.input[start..]
            .find('<')
            .map_or(self.input.len(), |offset| start + offset);
        self.pos = end;
        MarkupSegment::Text(&self.input[start..end])
    }

    fn read_tag(&mut self) -> MarkupSegment<'a> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        let mut quote: Option<u8> = None;
        let mut i = start + 1;

        while i < bytes.len() {
            let b = bytes[i];
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None if b == b'"' || b == b'\'' => quote = Some(b),
                None if b == b'>' => {
                    self.pos = i + 1;
                    return MarkupSegment::Tag(&self.input[start..self.pos]);
                }
                None => {}
            }
            i += 1;
        }

        tracing::warn!(
            offset = start,
            "unterminated tag in sanitized markup; treating remainder as text"
        );
        self.pos = self.input.len();
        MarkupSegment::Text(&self.input[start..])
    }
}

impl<'a> Iterator for MarkupLexer<'a> {
    type Item = MarkupSegment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }
        if self.input.as_bytes()[self.pos] == b'<' {
            Some(self.read_tag())
        } else {
            Some(self.read_text())
        }
    }
}

/// Decompose markup into tag and text runs.
pub fn decompose(markup: &str) -> Vec<MarkupSegment<'_>> {
    MarkupLexer::new(markup).tokenize()
}

/// Concatenate segments back into markup.
pub fn reassemble(segments: &[MarkupSegment<'_>]) -> String {
    segments.iter().map(MarkupSegment::as_str).collect()
}
