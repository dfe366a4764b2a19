//! Highlight matcher and injector.
//!
//! Finds occurrences of normalized terms inside the text runs of decomposed
//! markup and wraps them in the highlight marker. Tag runs are never
//! searched, so a term can not land inside a tag name or an attribute value.
//!
//! Matching rules:
//! - Terms are tried longest first, so a phrase wins over a word it contains
//! - The characters around a match must not be word characters
//!   (see [`BoundaryRule`]); a combining mark counts as part of its letter
//! - Character references such as `&amp;` are opaque: a match either
//!   contains a whole reference (the term `R&D` matches `R&amp;D`) or
//!   stays clear of it
//! - Matches never overlap; the leftmost accepted match claims its span
//!
//! Cost is `O(text length × term count)`, fine for card-sized inputs.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use super::markup::decompose;
use super::terms::{Term, TermSet};
use crate::models::{BoundaryRule, FinalMarkup, Fragment, MarkupSegment};

/// Haystack opening with a Unicode letter or combining mark.
static LETTER_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{M}]").expect("letter pattern is valid"));

/// Named, decimal, or hexadecimal character reference.
static CHAR_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);")
        .expect("character reference pattern is valid")
});

/// An accepted match inside one text run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match<'t> {
    /// Index of the text run in the segment list
    pub segment: usize,
    /// Byte offset of the first matched character within the run
    pub start: usize,
    /// Byte offset one past the match within the run
    pub end: usize,
    pub term: &'t Term,
}

// =============================================================================
// Highlighter
// =============================================================================

/// Compiled matcher for one [`TermSet`].
pub struct Highlighter<'t> {
    /// Terms ordered longest first
    ordered: Vec<&'t Term>,
    /// Combined case-insensitive alternation used to find candidate starts
    scanner: Option<Regex>,
    boundary: BoundaryRule,
}

impl<'t> Highlighter<'t> {
    pub fn new(terms: &'t TermSet, boundary: BoundaryRule) -> Self {
        let ordered = terms.longest_first();
        let scanner = if ordered.is_empty() {
            None
        } else {
            build_scanner(&ordered)
        };
        Self {
            ordered,
            scanner,
            boundary,
        }
    }

    /// Whether this highlighter can ever produce a match.
    pub fn is_active(&self) -> bool {
        self.scanner.is_some()
    }

    /// All accepted matches, in document order.
    pub fn find_matches(&self, segments: &[MarkupSegment<'_>]) -> Vec<Match<'t>> {
        segments
            .iter()
            .enumerate()
            .filter_map(|(index, segment)| match segment {
                MarkupSegment::Text(text) => Some((index, *text)),
                MarkupSegment::Tag(_) => None,
            })
            .flat_map(|(index, text)| {
                self.find_in_text(text)
                    .into_iter()
                    .map(move |(span, term)| Match {
                        segment: index,
                        start: span.start,
                        end: span.end,
                        term,
                    })
            })
            .collect()
    }

    /// Wrap every match in the highlight marker.
    ///
    /// With no terms the segments pass through unchanged.
    pub fn inject(&self, segments: &[MarkupSegment<'_>]) -> FinalMarkup {
        if !self.is_active() {
            return segments.iter().copied().map(Fragment::from).collect::<Vec<_>>().into();
        }

        let mut fragments = Vec::with_capacity(segments.len());
        for segment in segments {
            match segment {
                MarkupSegment::Tag(raw) => fragments.push(Fragment::RawTag(raw.to_string())),
                MarkupSegment::Text(text) => self.inject_text(text, &mut fragments),
            }
        }
        FinalMarkup::new(fragments)
    }

    fn inject_text(&self, text: &str, fragments: &mut Vec<Fragment>) {
        let mut cursor = 0;
        for (span, _) in self.find_in_text(text) {
            if span.start > cursor {
                fragments.push(Fragment::Text(text[cursor..span.start].to_string()));
            }
            fragments.push(Fragment::Highlighted(text[span.clone()].to_string()));
            cursor = span.end;
        }
        if cursor < text.len() {
            fragments.push(Fragment::Text(text[cursor..].to_string()));
        }
    }

    /// Scan one text run left to right, claiming non-overlapping spans.
    fn find_in_text(&self, text: &str) -> Vec<(Range<usize>, &'t Term)> {
        let Some(scanner) = &self.scanner else {
            return Vec::new();
        };

        let references = reference_spans(text);
        let mut found = Vec::new();
        let mut pos = 0;

        while pos < text.len() {
            let Some(candidate) = scanner.find_at(text, pos) else {
                break;
            };
            let start = candidate.start();
            match self.accept_at(text, start, &references) {
                Some((end, term)) => {
                    found.push((start..end, term));
                    pos = end;
                }
                None => {
                    pos = start + text[start..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        found
    }

    /// First term, longest first, that matches at `start` with valid edges.
    fn accept_at(
        &self,
        text: &str,
        start: usize,
        references: &[Range<usize>],
    ) -> Option<(usize, &'t Term)> {
        self.ordered.iter().find_map(|&term| {
            let end = start + term.match_prefix(&text[start..])?;
            let clear = references
                .iter()
                .all(|r| r.end <= start || end <= r.start || (start <= r.start && r.end <= end));
            (clear && self.edges_ok(text, start, end)).then_some((end, term))
        })
    }

    fn edges_ok(&self, text: &str, start: usize, end: usize) -> bool {
        let before = text[..start].char_indices().next_back().map(|(i, _)| &text[i..start]);
        let after = &text[end..];
        !before.is_some_and(|s| self.starts_with_word_char(s)) && !self.starts_with_word_char(after)
    }

    fn starts_with_word_char(&self, s: &str) -> bool {
        match self.boundary {
            BoundaryRule::UnicodeLetter => starts_with_letter(s),
            BoundaryRule::AsciiWord => s
                .bytes()
                .next()
                .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_'),
        }
    }
}

fn build_scanner(ordered: &[&Term]) -> Option<Regex> {
    let pattern = ordered
        .iter()
        .map(|term| format!("(?:{})", term.pattern()))
        .collect::<Vec<_>>()
        .join("|");
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(scanner) => Some(scanner),
        Err(err) => {
            tracing::warn!(error = %err, "highlight scanner failed to compile; highlighting disabled");
            None
        }
    }
}

fn starts_with_letter(s: &str) -> bool {
    match s.as_bytes().first() {
        None => false,
        Some(b) if b.is_ascii() => b.is_ascii_alphabetic(),
        Some(_) => LETTER_START.is_match(s),
    }
}

fn reference_spans(text: &str) -> Vec<Range<usize>> {
    if !text.contains('&') {
        return Vec::new();
    }
    CHAR_REFERENCE.find_iter(text).map(|m| m.range()).collect()
}

/// Decompose sanitized markup and highlight it in one step.
pub fn highlight_markup(markup: &str, terms: &TermSet, boundary: BoundaryRule) -> FinalMarkup {
    let segments = decompose(markup);
    if terms.is_empty() {
        tracing::debug!("no highlight terms; markup passes through");
    }
    Highlighter::new(terms, boundary).inject(&segments)
}
