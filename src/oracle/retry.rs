//! Retry decorator for relevance oracles
//!
//! Retry policy belongs at the adapter boundary: the search core calls the
//! oracle once per category and aborts on the first error it sees.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::{Judgement, RelevanceOracle};
use crate::error::OracleError;

/// Bounded exponential backoff
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(4),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Wraps an oracle and retries transient (transport) failures
pub struct RetryingOracle<O> {
    inner: O,
    policy: RetryPolicy,
}

impl<O: RelevanceOracle> RetryingOracle<O> {
    pub fn new(inner: O, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }

    async fn with_retries<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, OracleError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OracleError>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Err(e) if e.is_transient() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        oracle = self.inner.name(),
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Oracle call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }
}

#[async_trait]
impl<O: RelevanceOracle> RelevanceOracle for RetryingOracle<O> {
    async fn judge(
        &self,
        query: &str,
        label: &str,
        description: Option<&str>,
    ) -> Result<Judgement, OracleError> {
        self.with_retries("judge", || self.inner.judge(query, label, description))
            .await
    }

    async fn select_subset(
        &self,
        query: &str,
        labels: &[String],
    ) -> Result<Vec<String>, OracleError> {
        self.with_retries("select_subset", || self.inner.select_subset(query, labels))
            .await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
