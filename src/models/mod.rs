//! Data models shared by the pipeline stages.
//!
//! Contains domain types for:
//! - [`HighlightSpec`] - What a search result asks to emphasize
//! - [`NormalizationPolicy`], [`TruncationBudget`] - Stage configuration values
//! - [`MarkupSegment`], [`Fragment`], [`FinalMarkup`] - Decomposed and rendered markup
//! - [`CardRecord`], [`CardPage`] - Upstream search results

mod card;
mod highlight;
mod policy;
mod segment;

pub use card::{CardPage, CardRecord, extract_full_name, extract_username};
pub use highlight::HighlightSpec;
pub use policy::{BoundaryRule, NormalizationPolicy, PhraseMode, PolicyVersion, TruncationBudget};
pub use segment::{
    FinalMarkup, Fragment, MarkupSegment, decode_entities, highlight_close_tag,
    highlight_open_tag, tag_name,
};
