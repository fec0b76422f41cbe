//! Relevance-guided search
//!
//! Walks the taxonomy from a start category and asks the relevance oracle
//! about each category it reaches. An irrelevant category prunes its whole
//! subtree; relevant leaves become hits.
//!
//! Two traversals share one relevance rule:
//! - `SearchEngine::search`: depth-first work list, children judged
//!   concurrently in batches of `fanout_width`
//! - `SearchEngine::search_sequential`: breadth-first, one oracle call at a
//!   time, kept as a baseline
//!
//! `SelectionExplorer` is a different strategy: instead of judging categories
//! one by one it asks the oracle to pick children from each sibling set.

mod engine;
mod selection;
mod sequential;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::taxonomy::CategoryId;

pub use engine::SearchEngine;
pub use selection::SelectionExplorer;

/// Canonical number of in-flight oracle calls per sibling batch
pub const DEFAULT_FANOUT_WIDTH: usize = 3;

/// Per-search options
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Start category; `None` starts at the synthetic root
    pub root: Option<CategoryId>,
    /// A category is relevant only when its confidence is strictly above this
    pub confidence_threshold: f64,
    /// Stop at the top of the loop once any hit exists
    pub bail_on_first_result: bool,
    pub fanout_width: usize,
}

impl SearchOptions {
    pub fn new(confidence_threshold: f64) -> Self {
        Self {
            root: None,
            confidence_threshold,
            bail_on_first_result: false,
            fanout_width: DEFAULT_FANOUT_WIDTH,
        }
    }

    pub fn starting_at(mut self, category_id: impl Into<CategoryId>) -> Self {
        self.root = Some(category_id.into());
        self
    }

    pub fn bail_on_first_result(mut self, bail: bool) -> Self {
        self.bail_on_first_result = bail;
        self
    }

    pub fn fanout_width(mut self, width: usize) -> Self {
        self.fanout_width = width;
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if !self.confidence_threshold.is_finite() {
            return Err(SearchError::InvalidOptions(format!(
                "confidence threshold must be finite, got {}",
                self.confidence_threshold
            )));
        }
        if self.fanout_width == 0 {
            return Err(SearchError::InvalidOptions(
                "fanout width must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// A relevant leaf reached by a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub category_id: CategoryId,
    /// Category names from the search start down to the hit, inclusive
    pub path: Vec<String>,
    pub confidence: f64,
}

/// Stable sort, highest confidence first
pub(crate) fn rank(hits: &mut [SearchHit]) {
    hits.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}
