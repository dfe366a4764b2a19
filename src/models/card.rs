//! Card records as delivered by the search backend.

use serde::{Deserialize, Serialize};

use super::HighlightSpec;

/// A single search result.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    /// Author line, usually `@username (Full Name)`
    #[serde(default)]
    pub author: String,
    /// Markdown body
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Terms the backend wants emphasized
    #[serde(default)]
    pub highlight_text: HighlightSpec,
    /// Avatar path or absolute URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl CardRecord {
    /// Telegram-style handle from the author line.
    pub fn username(&self) -> Option<&str> {
        extract_username(&self.author)
    }

    /// Display name from the author line.
    pub fn full_name(&self) -> Option<&str> {
        extract_full_name(&self.author)
    }
}

/// One page of search results.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPage {
    #[serde(default)]
    pub cards: Vec<CardRecord>,
    /// Total number of matches across all pages
    #[serde(default)]
    pub total_count: u64,
}

/// Handle after a leading `@`, up to the first space.
///
/// `"@alice (Alice Smith)"` yields `"alice"`.
pub fn extract_username(author: &str) -> Option<&str> {
    let rest = author.strip_prefix('@')?;
    let name = rest.split(' ').next()?;
    (!name.is_empty()).then_some(name)
}

/// Text inside the first pair of parentheses.
///
/// `"@alice (Alice Smith)"` yields `"Alice Smith"`.
pub fn extract_full_name(author: &str) -> Option<&str> {
    let open = author.find('(')?;
    let inner = &author[open + 1..];
    let close = inner.find(')')?;
    let name = &inner[..close];
    (!name.is_empty()).then_some(name)
}
