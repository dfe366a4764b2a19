//! Markdown rendering utilities.
//!
//! Provides safe markdown-to-HTML conversion: `comrak` renders, `ammonia`
//! sanitizes against the [`ALLOWED_TAGS`] table.

use std::collections::{HashMap, HashSet};

use ammonia::{Builder, UrlRelative};
use comrak::Options;

use super::allowlist::ALLOWED_TAGS;
use crate::config::ALLOWED_URL_SCHEMES;

/// Render markdown to unsanitized HTML.
///
/// Supports the card subset of markdown plus:
/// - Strikethrough (`~~text~~`)
/// - Tables
/// - Bare URL autolinks
/// - Hard line breaks on single newlines
///
/// Raw HTML in the source is omitted, never passed through.
pub fn render_markdown(markdown: &str) -> String {
    comrak::markdown_to_html(markdown, &render_options())
}

fn render_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.render.hardbreaks = true;
    options
}

/// Build the sanitizer from the allow-list table.
///
/// Anchors get `rel` through ammonia's link handling, every other fixed
/// attribute through [`Builder::set_tag_attribute_value`].
pub fn sanitizer() -> Builder<'static> {
    let mut tags = HashSet::new();
    let mut tag_attributes: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
    let mut classes: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
    let mut link_rel = None;

    for tag in ALLOWED_TAGS {
        tags.insert(tag.name);
        if !tag.attributes.is_empty() {
            tag_attributes.insert(tag.name, tag.attributes.iter().copied().collect());
        }
        if !tag.classes.is_empty() {
            classes.insert(tag.name, tag.classes.iter().copied().collect());
        }
        if tag.name == "a" {
            link_rel = tag
                .fixed
                .iter()
                .find(|(name, _)| *name == "rel")
                .map(|(_, value)| *value);
        }
    }

    let mut builder = Builder::empty();
    builder
        .tags(tags)
        .tag_attributes(tag_attributes)
        .generic_attributes(HashSet::new())
        .allowed_classes(classes)
        .url_schemes(ALLOWED_URL_SCHEMES.iter().copied().collect())
        .url_relative(UrlRelative::Deny)
        .link_rel(link_rel)
        .clean_content_tags(["script", "style"].into_iter().collect())
        .strip_comments(true);

    for tag in ALLOWED_TAGS {
        for (attribute, value) in tag.fixed {
            if tag.name == "a" && *attribute == "rel" {
                continue;
            }
            builder.set_tag_attribute_value(tag.name, *attribute, *value);
        }
    }
    builder
}

/// Sanitize HTML against the allow-list.
pub fn sanitize_html(html: &str) -> String {
    sanitizer().clean(html).to_string()
}

/// Convert markdown content to sanitized HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    sanitize_html(&render_markdown(markdown))
}
