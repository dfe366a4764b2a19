//! Tag and attribute allow-list.
//!
//! One static table describes every element that may appear in rendered
//! card markup. The sanitizer is built from it, and the highlight marker
//! emitted by [`crate::models::FinalMarkup::to_html`] is declared in it.

use crate::config::{HIGHLIGHT_CLASS, HIGHLIGHT_TAG, LINK_REL, LINK_TARGET};

/// Permitted element and its attribute rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllowedTag {
    pub name: &'static str,
    /// Attributes kept as written
    pub attributes: &'static [&'static str],
    /// Attributes forced to a fixed value
    pub fixed: &'static [(&'static str, &'static str)],
    /// Permitted values of `class`
    pub classes: &'static [&'static str],
}

impl AllowedTag {
    const fn bare(name: &'static str) -> Self {
        Self {
            name,
            attributes: &[],
            fixed: &[],
            classes: &[],
        }
    }

    const fn with_attributes(name: &'static str, attributes: &'static [&'static str]) -> Self {
        Self {
            name,
            attributes,
            fixed: &[],
            classes: &[],
        }
    }
}

/// Every element allowed in card markup.
pub const ALLOWED_TAGS: &[AllowedTag] = &[
    // Text blocks
    AllowedTag::bare("p"),
    AllowedTag::bare("br"),
    AllowedTag::bare("blockquote"),
    AllowedTag::bare("h1"),
    AllowedTag::bare("h2"),
    AllowedTag::bare("h3"),
    AllowedTag::bare("h4"),
    AllowedTag::bare("h5"),
    AllowedTag::bare("h6"),
    // Inline emphasis
    AllowedTag::bare("strong"),
    AllowedTag::bare("b"),
    AllowedTag::bare("em"),
    AllowedTag::bare("i"),
    AllowedTag::bare("u"),
    AllowedTag::bare("s"),
    AllowedTag::bare("del"),
    // Links
    AllowedTag {
        name: "a",
        attributes: &["href"],
        fixed: &[("target", LINK_TARGET), ("rel", LINK_REL)],
        classes: &[],
    },
    // Lists
    AllowedTag::bare("ul"),
    AllowedTag::with_attributes("ol", &["start"]),
    AllowedTag::bare("li"),
    // Code
    AllowedTag::bare("code"),
    AllowedTag::bare("pre"),
    // Tables
    AllowedTag::bare("table"),
    AllowedTag::bare("thead"),
    AllowedTag::bare("tbody"),
    AllowedTag::bare("tr"),
    AllowedTag::with_attributes("th", &["align"]),
    AllowedTag::with_attributes("td", &["align"]),
    // Highlight marker
    AllowedTag {
        name: HIGHLIGHT_TAG,
        attributes: &[],
        fixed: &[],
        classes: &[HIGHLIGHT_CLASS],
    },
];

/// Look up an element by lowercase name.
pub fn lookup(name: &str) -> Option<&'static AllowedTag> {
    ALLOWED_TAGS.iter().find(|tag| tag.name == name)
}

/// Whether `attribute` may appear on `tag`, either as written or forced.
pub fn permits_attribute(tag: &str, attribute: &str) -> bool {
    lookup(tag).is_some_and(|entry| {
        entry.attributes.contains(&attribute)
            || entry.fixed.iter().any(|(name, _)| *name == attribute)
            || (attribute == "class" && !entry.classes.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert!(lookup("p").is_some());
        assert!(lookup("script").is_none());
        assert!(lookup("img").is_none());
    }

    #[test]
    fn test_anchor_attributes() {
        assert!(permits_attribute("a", "href"));
        assert!(permits_attribute("a", "target"));
        assert!(permits_attribute("a", "rel"));
        assert!(!permits_attribute("a", "onclick"));
        assert!(!permits_attribute("a", "style"));
    }

    #[test]
    fn test_highlight_marker_declared() {
        let marker = lookup(HIGHLIGHT_TAG).unwrap();
        assert_eq!(marker.classes, &[HIGHLIGHT_CLASS]);
        assert!(permits_attribute(HIGHLIGHT_TAG, "class"));
    }

    #[test]
    fn test_no_duplicate_entries() {
        for (i, tag) in ALLOWED_TAGS.iter().enumerate() {
            assert!(
                ALLOWED_TAGS[i + 1..].iter().all(|other| other.name != tag.name),
                "duplicate entry for {}",
                tag.name
            );
        }
    }
}
