//! Core rendering pipeline.
//!
//! This module provides:
//! - [`TermSet`] normalization of highlight specifications
//! - [`decompose`] splitting of sanitized markup into tag and text runs
//! - [`Highlighter`] matching and marker injection
//! - [`truncate_markdown`] markdown-safe previews
//! - [`CardRenderer`] and [`render_card`] tying the stages together

pub mod error;
pub mod highlight;
pub mod markup;
mod render;
pub mod terms;
pub mod truncate;

pub use highlight::{Highlighter, Match, highlight_markup};
pub use markup::{MarkupLexer, decompose, reassemble};
pub use render::{CardRenderer, render_card};
pub use terms::{Term, TermSet};
pub use truncate::{DelimiterBalance, Truncated, truncate_markdown, truncate_preview};
