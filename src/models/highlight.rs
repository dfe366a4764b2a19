//! Highlight specification as delivered with each search result.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// What a search result asks to emphasize.
///
/// Upstream records carry this as an optional field that may be missing,
/// `null`, a single string, or a list of strings. Any other shape is
/// treated as [`HighlightSpec::Absent`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum HighlightSpec {
    /// Nothing to highlight
    #[default]
    Absent,
    /// A single phrase
    Phrase(String),
    /// Ordered list of phrases
    List(Vec<String>),
}

impl HighlightSpec {
    /// Build a list spec from anything string-like.
    pub fn list<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(phrases.into_iter().map(Into::into).collect())
    }

    /// Flatten into the list of phrases, in order.
    pub fn phrases(&self) -> Vec<&str> {
        match self {
            Self::Absent => Vec::new(),
            Self::Phrase(phrase) => vec![phrase.as_str()],
            Self::List(phrases) => phrases.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Interpret an arbitrary JSON value.
    ///
    /// Non-string list elements are skipped.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(phrase) => Self::Phrase(phrase),
            Value::Array(items) => Self::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(phrase) => Some(phrase),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => Self::Absent,
        }
    }
}

impl From<&str> for HighlightSpec {
    fn from(phrase: &str) -> Self {
        Self::Phrase(phrase.to_string())
    }
}

impl From<String> for HighlightSpec {
    fn from(phrase: String) -> Self {
        Self::Phrase(phrase)
    }
}

impl From<Vec<String>> for HighlightSpec {
    fn from(phrases: Vec<String>) -> Self {
        Self::List(phrases)
    }
}

impl From<Option<String>> for HighlightSpec {
    fn from(phrase: Option<String>) -> Self {
        phrase.map_or(Self::Absent, Self::Phrase)
    }
}

impl<'de> Deserialize<'de> for HighlightSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> HighlightSpec {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_deserialize_shapes() {
        assert_eq!(parse("null"), HighlightSpec::Absent);
        assert_eq!(parse("\"rust\""), HighlightSpec::Phrase("rust".to_string()));
        assert_eq!(parse("[\"a\", \"b\"]"), HighlightSpec::list(["a", "b"]));
    }

    #[test]
    fn test_unexpected_shapes_are_absent() {
        assert_eq!(parse("42"), HighlightSpec::Absent);
        assert_eq!(parse("true"), HighlightSpec::Absent);
        assert_eq!(parse("{\"term\": \"rust\"}"), HighlightSpec::Absent);
    }

    #[test]
    fn test_non_string_list_elements_ignored() {
        assert_eq!(
            parse("[\"rust\", 1, null, {\"x\": 1}, \"go\"]"),
            HighlightSpec::list(["rust", "go"])
        );
    }

    #[test]
    fn test_serialize_roundtrip_shape() {
        assert_eq!(serde_json::to_string(&HighlightSpec::Absent).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&HighlightSpec::list(["a"])).unwrap(),
            "[\"a\"]"
        );
    }

    #[test]
    fn test_phrases() {
        assert!(HighlightSpec::Absent.phrases().is_empty());
        assert_eq!(HighlightSpec::from("x").phrases(), vec!["x"]);
    }
}
