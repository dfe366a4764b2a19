//! Memoization of rendered cards.
//!
//! Re-rendering the same card with the same highlight terms produces the same
//! output, so callers that redraw often can keep results here. Entries are
//! keyed by a SHA-256 digest of everything that affects the output and are
//! evicted oldest-first once the cache is full. Nothing depends on the cache
//! for correctness.

use std::collections::{HashMap, VecDeque};

use sha2::{Digest, Sha256};

use crate::config::{DEFAULT_CACHE_CAPACITY, RenderConfig};
use crate::core::CardRenderer;
use crate::models::{FinalMarkup, HighlightSpec, TruncationBudget};

/// Bounded FIFO cache of rendered cards.
#[derive(Debug)]
pub struct RenderCache {
    capacity: usize,
    entries: HashMap<String, FinalMarkup>,
    order: VecDeque<String>,
}

impl RenderCache {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RenderCache capacity must be greater than 0");

        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    /// Digest of the inputs that determine a render result.
    pub fn key(
        config: &RenderConfig,
        text: &str,
        spec: &HighlightSpec,
        budget: Option<&TruncationBudget>,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(config).unwrap_or_default());
        hasher.update([0u8]);
        hasher.update(serde_json::to_vec(spec).unwrap_or_default());
        hasher.update([0u8]);
        match budget {
            Some(budget) => {
                hasher.update((budget.words as u64).to_le_bytes());
                hasher.update((budget.floor as u64).to_le_bytes());
            }
            None => hasher.update(b"full"),
        }
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn get(&self, key: &str) -> Option<&FinalMarkup> {
        self.entries.get(key)
    }

    /// Store a result, evicting the oldest entry when full.
    pub fn insert(&mut self, key: String, markup: FinalMarkup) {
        if self.entries.contains_key(&key) {
            self.entries.insert(key, markup);
            return;
        }
        if self.entries.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, markup);
    }

    /// Return the cached result or render and remember it.
    pub fn get_or_render(
        &mut self,
        renderer: &CardRenderer,
        text: &str,
        spec: &HighlightSpec,
        budget: Option<&TruncationBudget>,
    ) -> FinalMarkup {
        let key = Self::key(renderer.config(), text, spec, budget);
        if let Some(hit) = self.get(&key) {
            return hit.clone();
        }
        let markup = renderer.render(text, spec, budget);
        self.insert(key, markup.clone());
        markup
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
