//! Pipeline configuration.
//!
//! Centralizes the constants used by the highlighting and truncation stages,
//! plus [`RenderConfig`], the runtime configuration that can be loaded from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;
use crate::models::{NormalizationPolicy, TruncationBudget};

// =============================================================================
// Highlighting
// =============================================================================

/// Minimum term length in code points. Shorter candidates are discarded.
pub const MIN_TERM_LENGTH: usize = 2;

/// Minimum term length used by the first revision of the normalizer.
pub const LEGACY_MIN_TERM_LENGTH: usize = 3;

/// Characters that separate terms inside a single highlight phrase.
pub const TERM_DELIMITERS: &[char] = &[',', ';', '|'];

/// Inline element wrapping a highlighted span.
pub const HIGHLIGHT_TAG: &str = "mark";

/// Class carried by the highlight marker element.
pub const HIGHLIGHT_CLASS: &str = "highlight";

// =============================================================================
// Truncation
// =============================================================================

/// Default word budget for card previews.
pub const DEFAULT_WORD_BUDGET: usize = 50;

/// Budget below which truncation gives up and keeps the full text.
pub const DEFAULT_WORD_FLOOR: usize = 5;

/// Factor applied to the word budget after a rejected round.
pub const BUDGET_SHRINK_FACTOR: f64 = 0.8;

/// A safe cut point must sit at or after this fraction of the candidate.
pub const SAFE_CUT_MIN_RATIO: f64 = 0.6;

/// Marker appended to a truncated preview.
pub const ELLIPSIS: &str = "...";

// =============================================================================
// Sanitizer
// =============================================================================

/// `rel` value forced onto every anchor.
pub const LINK_REL: &str = "noopener noreferrer";

/// `target` value forced onto every anchor.
pub const LINK_TARGET: &str = "_blank";

/// URL schemes permitted in `href` values.
pub const ALLOWED_URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

// =============================================================================
// Cache
// =============================================================================

/// Default number of rendered cards kept by a [`crate::utils::RenderCache`].
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Runtime configuration for a [`crate::core::CardRenderer`].
///
/// Every field has a default, so an empty TOML document is valid:
///
/// ```toml
/// [policy]
/// version = "v2"
/// min_term_length = 2
///
/// [truncation]
/// words = 50
/// floor = 5
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// How highlight specifications become terms.
    pub policy: NormalizationPolicy,
    /// Word budget for card previews.
    pub truncation: TruncationBudget,
}

impl RenderConfig {
    /// Parse a configuration document.
    ///
    /// The truncation budget is validated after parsing.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: RenderConfig = toml::from_str(source)?;
        config.truncation.validate()?;
        Ok(config)
    }

    /// Load a configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}
