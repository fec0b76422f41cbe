//! Relevance Oracle
//!
//! The search core never decides relevance itself. It asks an injected
//! oracle "is this category relevant to this query?" and gets back a
//! boolean verdict plus a confidence score.
//!
//! Implementations:
//! - `OpenAiRelevanceOracle`: OpenAI-compatible completions with logprobs
//! - `RetryingOracle`: retry/backoff decorator around any oracle
//! - `ScriptedOracle`: deterministic answers and a call trace, for tests

mod openai;
mod retry;
mod scripted;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OracleError;

pub use openai::OpenAiRelevanceOracle;
pub use retry::{RetryPolicy, RetryingOracle};
pub use scripted::{OracleCall, ScriptedOracle};

/// The oracle's answer for one label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Judgement {
    pub verdict: bool,
    /// Adapter-calibrated score; not guaranteed to be a normalized probability
    pub confidence: f64,
}

impl Judgement {
    pub fn new(verdict: bool, confidence: f64) -> Self {
        Self {
            verdict,
            confidence,
        }
    }

    pub fn relevant(confidence: f64) -> Self {
        Self::new(true, confidence)
    }

    pub fn irrelevant(confidence: f64) -> Self {
        Self::new(false, confidence)
    }

    /// Convert a raw verdict token such as `"TRUE"` or `"Response: FALSE"`.
    ///
    /// Only a (case-insensitive) `TRUE` counts as a positive verdict.
    pub fn from_token(token: &str, confidence: f64) -> Self {
        let token = token.trim();
        let token = match token.split_once("Response:") {
            Some((_, rest)) => rest.trim(),
            None => token,
        };
        Self::new(token.eq_ignore_ascii_case("true"), confidence)
    }

    /// Relevant iff the verdict is positive and confidence exceeds the threshold
    pub fn passes(&self, confidence_threshold: f64) -> bool {
        self.verdict && self.confidence > confidence_threshold
    }
}

/// External semantic-relevance judge.
///
/// Calls are treated as slow and network-bound. The core does no retrying or
/// caching; adapters own timeouts and retry policy.
#[async_trait]
pub trait RelevanceOracle: Send + Sync {
    /// Is `label` (with optional `description`) relevant to `query`?
    async fn judge(
        &self,
        query: &str,
        label: &str,
        description: Option<&str>,
    ) -> Result<Judgement, OracleError>;

    /// Pick the subset of `labels` relevant to `query`.
    ///
    /// Used by the child-selection explorer, not by the pruning search.
    async fn select_subset(
        &self,
        _query: &str,
        _labels: &[String],
    ) -> Result<Vec<String>, OracleError> {
        Err(OracleError::Unsupported("select_subset"))
    }

    /// Name for logging
    fn name(&self) -> &str;
}
