//! Normalization policy and truncation budget.

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{
    DEFAULT_WORD_BUDGET, DEFAULT_WORD_FLOOR, LEGACY_MIN_TERM_LENGTH, MIN_TERM_LENGTH,
};
use crate::core::error::ConfigError;

// =============================================================================
// Normalization Policy
// =============================================================================

/// Revision of the term normalization rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyVersion {
    /// ASCII word boundaries, three-character minimum, phrases split into words.
    V1,
    /// Unicode letter boundaries, two-character minimum, phrases preserved.
    #[default]
    V2,
}

/// Rule deciding whether the characters around a match end a word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryRule {
    /// Neighbours must not be in the Unicode `Letter` category.
    #[default]
    UnicodeLetter,
    /// Neighbours must not be `[A-Za-z0-9_]`.
    AsciiWord,
}

/// How multi-word highlight phrases become terms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhraseMode {
    /// Plain phrases stay whole; link labels fall back to single words.
    #[default]
    PreservePhrases,
    /// Every phrase is split on whitespace.
    SplitWords,
}

/// The complete, versioned set of rules used by the term normalizer.
///
/// [`NormalizationPolicy::default`] is the current revision. Older revisions
/// are only used when selected explicitly with [`NormalizationPolicy::for_version`].
///
/// When deserialized, fields left out take the value of the selected
/// `version`, so `version = "v1"` alone yields the complete V1 rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NormalizationPolicy {
    pub version: PolicyVersion,
    /// Minimum term length in code points
    pub min_term_length: usize,
    pub boundary: BoundaryRule,
    pub phrase_mode: PhraseMode,
}

impl NormalizationPolicy {
    /// Rules as shipped by the given revision.
    pub fn for_version(version: PolicyVersion) -> Self {
        match version {
            PolicyVersion::V1 => Self {
                version,
                min_term_length: LEGACY_MIN_TERM_LENGTH,
                boundary: BoundaryRule::AsciiWord,
                phrase_mode: PhraseMode::SplitWords,
            },
            PolicyVersion::V2 => Self {
                version,
                min_term_length: MIN_TERM_LENGTH,
                boundary: BoundaryRule::UnicodeLetter,
                phrase_mode: PhraseMode::PreservePhrases,
            },
        }
    }
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self::for_version(PolicyVersion::default())
    }
}

/// Wire form of [`NormalizationPolicy`] with every field optional.
#[derive(Deserialize)]
struct PolicyFields {
    #[serde(default)]
    version: PolicyVersion,
    min_term_length: Option<usize>,
    boundary: Option<BoundaryRule>,
    phrase_mode: Option<PhraseMode>,
}

impl<'de> Deserialize<'de> for NormalizationPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = PolicyFields::deserialize(deserializer)?;
        let base = Self::for_version(fields.version);
        Ok(Self {
            version: fields.version,
            min_term_length: fields.min_term_length.unwrap_or(base.min_term_length),
            boundary: fields.boundary.unwrap_or(base.boundary),
            phrase_mode: fields.phrase_mode.unwrap_or(base.phrase_mode),
        })
    }
}

// =============================================================================
// Truncation Budget
// =============================================================================

/// Word limits consumed by the markdown truncator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncationBudget {
    /// Maximum number of words in a preview
    pub words: usize,
    /// Smallest budget tried before falling back to the full text
    pub floor: usize,
}

impl TruncationBudget {
    /// Create a validated budget.
    pub fn new(words: usize, floor: usize) -> Result<Self, ConfigError> {
        let budget = Self { words, floor };
        budget.validate()?;
        Ok(budget)
    }

    /// Check the invariants `words > 0`, `floor > 0` and `floor <= words`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.words == 0 {
            return Err(ConfigError::ZeroBudget);
        }
        if self.floor == 0 {
            return Err(ConfigError::ZeroFloor);
        }
        if self.floor > self.words {
            return Err(ConfigError::FloorAboveBudget {
                words: self.words,
                floor: self.floor,
            });
        }
        Ok(())
    }
}

impl Default for TruncationBudget {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORD_BUDGET,
            floor: DEFAULT_WORD_FLOOR,
        }
    }
}
