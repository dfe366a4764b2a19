//! Error types for configuration and construction.
//!
//! The rendering pipeline itself never fails: malformed input degrades to a
//! best-effort result. Errors only exist where a caller builds configuration:
//!
//! - [`ConfigError`] - Invalid truncation budgets and unreadable config files

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Word budget of zero
    #[error("word budget must be greater than 0")]
    ZeroBudget,
    /// Floor of zero would let truncation shrink to nothing
    #[error("word floor must be greater than 0")]
    ZeroFloor,
    /// Floor larger than the budget it bounds
    #[error("word floor ({floor}) exceeds word budget ({words})")]
    FloorAboveBudget { words: usize, floor: usize },
    /// Config file could not be read
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Config document is not valid TOML for [`crate::config::RenderConfig`]
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
