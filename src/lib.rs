//! Highlighted, markdown-safe rendering of search result cards.
//!
//! A card's markdown text is truncated to a word budget without breaking
//! delimiters, rendered and sanitized, then the search terms delivered with
//! the result are wrapped in a highlight marker, strictly outside of tags.
//!
//! ```
//! use cardmark::{HighlightSpec, render_card};
//!
//! let markup = render_card("Techlead / **AI** / sport", &HighlightSpec::from("AI"), None);
//! assert_eq!(markup.highlight_count(), 1);
//! ```

pub mod config;
pub mod core;
pub mod models;
pub mod utils;

pub use crate::config::RenderConfig;
pub use crate::core::error::ConfigError;
pub use crate::core::{CardRenderer, TermSet, render_card, truncate_markdown};
pub use crate::models::{
    CardPage, CardRecord, FinalMarkup, Fragment, HighlightSpec, NormalizationPolicy,
    TruncationBudget,
};
pub use crate::utils::RenderCache;
