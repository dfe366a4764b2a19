//! Card rendering pipeline.
//!
//! `text → truncate → render markdown → sanitize → decompose → highlight`.
//! Every step is pure, so a [`CardRenderer`] can be shared freely between
//! calls; nothing is cached here.

use std::borrow::Cow;

use ammonia::Builder;

use super::highlight::highlight_markup;
use super::terms::TermSet;
use super::truncate::truncate_markdown;
use crate::config::RenderConfig;
use crate::models::{CardRecord, FinalMarkup, HighlightSpec, TruncationBudget};
use crate::utils::markdown::{render_markdown, sanitizer};

/// Renders card text with highlights.
pub struct CardRenderer {
    config: RenderConfig,
    sanitizer: Builder<'static>,
}

impl CardRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            sanitizer: sanitizer(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `text`, truncated to `budget` when one is given.
    ///
    /// Empty or whitespace-only text yields empty output.
    pub fn render(
        &self,
        text: &str,
        spec: &HighlightSpec,
        budget: Option<&TruncationBudget>,
    ) -> FinalMarkup {
        if text.trim().is_empty() {
            return FinalMarkup::default();
        }

        let source = match budget {
            Some(budget) => match truncate_markdown(text, budget) {
                outcome if outcome.is_cut() => Cow::Owned(outcome.into_text(text)),
                _ => Cow::Borrowed(text),
            },
            None => Cow::Borrowed(text),
        };

        let markup = self.sanitizer.clean(&render_markdown(&source)).to_string();
        let terms = TermSet::from_spec(spec, &self.config.policy);
        highlight_markup(&markup, &terms, self.config.policy.boundary)
    }

    /// Render a preview using the configured truncation budget.
    pub fn render_preview(&self, text: &str, spec: &HighlightSpec) -> FinalMarkup {
        self.render(text, spec, Some(&self.config.truncation))
    }

    /// Render the full text without truncation.
    pub fn render_full(&self, text: &str, spec: &HighlightSpec) -> FinalMarkup {
        self.render(text, spec, None)
    }

    /// Render a search result with its own highlight terms.
    pub fn render_record(&self, record: &CardRecord, preview: bool) -> FinalMarkup {
        if preview {
            self.render_preview(&record.text, &record.highlight_text)
        } else {
            self.render_full(&record.text, &record.highlight_text)
        }
    }
}

impl Default for CardRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

/// Render one card with the default configuration.
pub fn render_card(
    text: &str,
    spec: &HighlightSpec,
    budget: Option<&TruncationBudget>,
) -> FinalMarkup {
    CardRenderer::default().render(text, spec, budget)
}
