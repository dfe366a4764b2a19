//! Utilities around the pipeline.
//!
//! Provides:
//! - [`markdown_to_html`] - Markdown rendering with allow-list sanitization
//! - [`ALLOWED_TAGS`] - The tag/attribute allow-list table
//! - [`RenderCache`] - Optional memoization of rendered cards

pub mod allowlist;
mod cache;
pub mod markdown;

pub use allowlist::{ALLOWED_TAGS, AllowedTag};
pub use cache::RenderCache;
pub use markdown::{markdown_to_html, render_markdown, sanitize_html};
