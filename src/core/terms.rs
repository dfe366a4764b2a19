//! Term normalizer.
//!
//! Turns a [`HighlightSpec`] into a [`TermSet`]: an ordered, duplicate-free
//! list of literal terms, each with its own case-insensitive matcher.
//!
//! Terms are stored in NFC. Matchers run against sanitized markup, so a
//! character the serializer escapes (`&`, `<`, `>`, quotes, no-break space)
//! matches either raw or as its character reference, and a precomposed
//! character also matches its canonical decomposition.
//!
//! Handles:
//! - Markdown-link-shaped phrases (`[label](target)`): only the label is a term
//! - Delimiters (`,` `;` `|`) inside a phrase
//! - Minimum term length in code points
//! - Case-insensitive deduplication, first occurrence wins

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use unicode_normalization::UnicodeNormalization;

use crate::config::TERM_DELIMITERS;
use crate::models::{HighlightSpec, NormalizationPolicy, PhraseMode};

/// A phrase that is exactly one markdown link.
static LINK_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([^\]]*)\]\(([^)\s]*)\)$").expect("link phrase pattern is valid")
});

/// Markdown links embedded in a longer phrase.
static EMBEDDED_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]*)\]\([^)\s]*\)").expect("embedded link pattern is valid")
});

// =============================================================================
// Term
// =============================================================================

/// A literal string selected for emphasis.
#[derive(Clone, Debug)]
pub struct Term {
    text: String,
    key: String,
    char_len: usize,
    /// Unanchored regex source matching the term inside markup text
    pattern: String,
    /// Case-insensitive matcher for `pattern`, anchored at the haystack start
    matcher: Regex,
}

impl Term {
    /// Build a term and its matcher. Returns `None` for empty input or if
    /// the matcher cannot be compiled.
    fn new(text: String) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        let pattern = markup_pattern(&text);
        let anchored = format!("^(?:{})", pattern);
        let matcher = match RegexBuilder::new(&anchored).case_insensitive(true).build() {
            Ok(matcher) => matcher,
            Err(err) => {
                tracing::warn!(term = %text, error = %err, "dropping term with invalid matcher");
                return None;
            }
        };
        Some(Self {
            key: text.to_lowercase(),
            char_len: text.chars().count(),
            text,
            pattern,
            matcher,
        })
    }

    /// The term as written (case preserved).
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in Unicode code points.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// Regex source for this term, suitable for combining into an alternation.
    pub(crate) fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Byte length of a case-insensitive match of this term at the very
    /// start of `haystack`, which is markup text.
    pub fn match_prefix(&self, haystack: &str) -> Option<usize> {
        self.matcher.find(haystack).map(|m| m.end())
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Term {}

// =============================================================================
// TermSet
// =============================================================================

/// Ordered, case-insensitively unique collection of [`Term`]s.
///
/// Built fresh per render call; immutable once built. An empty set means
/// "no highlighting".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TermSet {
    terms: Vec<Term>,
}

impl TermSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Normalize a highlight specification.
    pub fn from_spec(spec: &HighlightSpec, policy: &NormalizationPolicy) -> Self {
        let mut builder = Builder::new(policy);
        for phrase in spec.phrases() {
            for token in phrase_tokens(phrase, policy.phrase_mode) {
                builder.push(token);
            }
        }
        builder.finish()
    }

    /// Build a set from literal terms, skipping phrase parsing.
    ///
    /// Length filtering and deduplication still apply.
    pub fn from_terms<I, S>(terms: I, policy: &NormalizationPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = Builder::new(policy);
        for term in terms {
            builder.push(collapse_whitespace(term.as_ref()));
        }
        builder.finish()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Terms in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.terms.iter().map(Term::as_str).collect()
    }

    /// Terms ordered longest first (code points); ties keep first-seen order.
    pub fn longest_first(&self) -> Vec<&Term> {
        let mut ordered: Vec<&Term> = self.terms.iter().collect();
        ordered.sort_by(|a, b| b.char_len.cmp(&a.char_len));
        ordered
    }
}

/// Accumulates tokens, applying the length and uniqueness rules.
struct Builder {
    min_len: usize,
    seen: HashSet<String>,
    terms: Vec<Term>,
}

impl Builder {
    fn new(policy: &NormalizationPolicy) -> Self {
        Self {
            min_len: policy.min_term_length.max(1),
            seen: HashSet::new(),
            terms: Vec::new(),
        }
    }

    fn push(&mut self, token: String) {
        let token: String = token.trim().nfc().collect();
        if token.chars().count() < self.min_len {
            return;
        }
        if self.seen.contains(&token.to_lowercase()) {
            return;
        }
        if let Some(term) = Term::new(token) {
            self.seen.insert(term.key.clone());
            self.terms.push(term);
        }
    }

    fn finish(self) -> TermSet {
        TermSet { terms: self.terms }
    }
}

/// Character references the sanitizer may write for a character.
fn reference_forms(c: char) -> Option<&'static [&'static str]> {
    match c {
        '&' => Some(&["&amp;", "&#38;"]),
        '<' => Some(&["&lt;", "&#60;"]),
        '>' => Some(&["&gt;", "&#62;"]),
        '"' => Some(&["&quot;", "&#34;"]),
        '\'' => Some(&["&#39;", "&#x27;", "&apos;"]),
        '\u{a0}' => Some(&["&nbsp;", "&#160;"]),
        _ => None,
    }
}

/// Regex source matching `text` the way it can appear in a markup text run.
fn markup_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() * 2);
    let mut buf = [0u8; 4];

    for c in text.chars() {
        let literal = regex::escape(c.encode_utf8(&mut buf));
        let mut forms: Vec<String> = reference_forms(c)
            .unwrap_or_default()
            .iter()
            .map(|form| regex::escape(form))
            .collect();

        let decomposed: String = std::iter::once(c).nfd().collect();
        if decomposed.chars().count() > 1 {
            forms.push(regex::escape(&decomposed));
        }

        if forms.is_empty() {
            pattern.push_str(&literal);
        } else {
            forms.push(literal);
            pattern.push_str("(?:");
            pattern.push_str(&forms.join("|"));
            pattern.push(')');
        }
    }
    pattern
}

// =============================================================================
// Phrase Parsing
// =============================================================================

/// Split one phrase into candidate tokens.
///
/// A phrase that is a single markdown link contributes the words of its
/// label. Otherwise embedded links are reduced to their labels and the
/// phrase is split on delimiters, and on whitespace too in
/// [`PhraseMode::SplitWords`].
fn phrase_tokens(phrase: &str, mode: PhraseMode) -> Vec<String> {
    let phrase = phrase.trim();

    if let Some(caps) = LINK_PHRASE.captures(phrase) {
        let label = caps.get(1).map_or("", |m| m.as_str());
        return split_tokens(label, true);
    }

    let body = EMBEDDED_LINK.replace_all(phrase, "$1");
    split_tokens(&body, mode == PhraseMode::SplitWords)
}

fn split_tokens(body: &str, split_words: bool) -> Vec<String> {
    body.split(|c: char| TERM_DELIMITERS.contains(&c) || (split_words && c.is_whitespace()))
        .map(collapse_whitespace)
        .filter(|token| !token.is_empty())
        .collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PolicyVersion;

    fn terms(spec: HighlightSpec) -> Vec<String> {
        TermSet::from_spec(&spec, &NormalizationPolicy::default())
            .texts()
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_absent_spec_is_empty() {
        assert!(terms(HighlightSpec::Absent).is_empty());
        assert!(terms(HighlightSpec::from("")).is_empty());
        assert!(terms(HighlightSpec::list(Vec::<String>::new())).is_empty());
    }

    #[test]
    fn test_single_phrase() {
        assert_eq!(terms(HighlightSpec::from("rust")), vec!["rust"]);
    }

    #[test]
    fn test_phrase_preserved() {
        assert_eq!(
            terms(HighlightSpec::list(["Panchenko", "Panchenko Daniil"])),
            vec!["Panchenko", "Panchenko Daniil"]
        );
    }

    #[test]
    fn test_inner_whitespace_collapsed() {
        assert_eq!(
            terms(HighlightSpec::from("  machine \n  learning ")),
            vec!["machine learning"]
        );
    }

    #[test]
    fn test_delimiters_split() {
        assert_eq!(
            terms(HighlightSpec::from("rust, go;python | zig")),
            vec!["rust", "go", "python", "zig"]
        );
    }

    #[test]
    fn test_link_label_extracted() {
        assert_eq!(
            terms(HighlightSpec::from("[REG.RU](https://reg.ru/)")),
            vec!["REG.RU"]
        );
    }

    #[test]
    fn test_link_label_split_into_words() {
        assert_eq!(
            terms(HighlightSpec::list(["[Daniil Panchenko](https://t.me/dp)"])),
            vec!["Daniil", "Panchenko"]
        );
    }

    #[test]
    fn test_embedded_link_target_dropped() {
        assert_eq!(
            terms(HighlightSpec::from("hosted at [REG.RU](https://reg.ru/)")),
            vec!["hosted at REG.RU"]
        );
    }

    #[test]
    fn test_short_tokens_dropped() {
        assert_eq!(terms(HighlightSpec::list(["a", "AI", "x, IT"])), vec!["AI", "IT"]);
    }

    #[test]
    fn test_length_counts_code_points() {
        // Two Cyrillic letters are four bytes but two code points.
        assert_eq!(terms(HighlightSpec::from("ИИ")), vec!["ИИ"]);
        assert!(terms(HighlightSpec::from("Я")).is_empty());
    }

    #[test]
    fn test_case_insensitive_dedup_keeps_first() {
        assert_eq!(
            terms(HighlightSpec::list(["Rust", "rust", "RUST", "Go"])),
            vec!["Rust", "Go"]
        );
    }

    #[test]
    fn test_split_words_mode() {
        let policy = NormalizationPolicy {
            phrase_mode: PhraseMode::SplitWords,
            ..NormalizationPolicy::default()
        };
        let set = TermSet::from_spec(&HighlightSpec::from("Panchenko Daniil"), &policy);
        assert_eq!(set.texts(), vec!["Panchenko", "Daniil"]);
    }

    #[test]
    fn test_legacy_minimum_length() {
        let policy = NormalizationPolicy::for_version(PolicyVersion::V1);
        let set = TermSet::from_spec(&HighlightSpec::from("AI IT rust"), &policy);
        assert_eq!(set.texts(), vec!["rust"]);
    }

    #[test]
    fn test_longest_first_is_stable() {
        let set = TermSet::from_terms(["ab", "abcd", "cd", "abc"], &NormalizationPolicy::default());
        let ordered: Vec<&str> = set.longest_first().into_iter().map(Term::as_str).collect();
        assert_eq!(ordered, vec!["abcd", "abc", "ab", "cd"]);
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let set = TermSet::from_terms(["C++", "a.b"], &NormalizationPolicy::default());
        let cpp = set.iter().next().unwrap();
        assert_eq!(cpp.match_prefix("c++ rocks"), Some(3));
        assert_eq!(cpp.match_prefix("cxx"), None);
        let dotted = set.iter().nth(1).unwrap();
        assert_eq!(dotted.match_prefix("aXb"), None);
    }

    #[test]
    fn test_match_prefix_through_references() {
        let set = TermSet::from_terms(["R&D", "<b>", "it's"], &NormalizationPolicy::default());
        let terms: Vec<&Term> = set.iter().collect();
        assert_eq!(terms[0].match_prefix("R&amp;D team"), Some("R&amp;D".len()));
        assert_eq!(terms[0].match_prefix("r&d team"), Some(3));
        assert_eq!(terms[0].match_prefix("R&amp;B"), None);
        assert_eq!(terms[1].match_prefix("&lt;b&gt;"), Some("&lt;b&gt;".len()));
        assert_eq!(terms[2].match_prefix("it&#39;s"), Some("it&#39;s".len()));
    }

    #[test]
    fn test_terms_stored_composed_and_match_both_forms() {
        let set = TermSet::from_terms(["cafe\u{301}"], &NormalizationPolicy::default());
        let term = set.iter().next().unwrap();
        assert_eq!(term.as_str(), "caf\u{e9}");
        assert_eq!(term.char_len(), 4);
        assert_eq!(term.match_prefix("caf\u{e9} au lait"), Some("caf\u{e9}".len()));
        assert_eq!(term.match_prefix("cafe\u{301} au lait"), Some("cafe\u{301}".len()));
        assert_eq!(term.match_prefix("CAFE\u{301}"), Some("CAFE\u{301}".len()));
    }

    #[test]
    fn test_match_prefix_case_insensitive() {
        let set = TermSet::from_terms(["Техлид"], &NormalizationPolicy::default());
        let term = set.iter().next().unwrap();
        assert_eq!(term.match_prefix("ТЕХЛИД и"), Some("ТЕХЛИД".len()));
        assert_eq!(term.match_prefix("и техлид"), None);
    }
}
