//! Bounded exponential-backoff retry around single page requests.

use super::client::CollectionClient;
use super::types::PageQuery;
use crate::error::{FetchError, Result};
use crate::fanout::FetchContext;
use shared::PageResult;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts are `max_retries + 1`
    pub max_retries: u32,
    /// Wait before the first retry, doubled for every retry after it
    pub base_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_interval: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Wait after failed attempt `attempt` (zero-based): `base_interval * 2^attempt`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_interval.saturating_mul(factor)
    }
}

impl CollectionClient {
    /// Fetch one page, retrying transient failures with exponential backoff
    ///
    /// Each attempt holds one admission permit for the duration of the
    /// request only. Cancellation is observed while waiting for a permit,
    /// during the request and during the backoff sleep.
    pub(crate) async fn fetch_with_retry(
        &self,
        ctx: &FetchContext,
        query: &PageQuery,
    ) -> Result<PageResult> {
        let policy = self.config.retry;
        let mut attempt = 0;

        loop {
            let error = match self.attempt_once(ctx, query).await {
                Ok(page) => {
                    if attempt > 0 {
                        debug!(
                            collection_type = query.collection_type.as_str(),
                            offset = query.offset,
                            attempt = attempt + 1,
                            "Request succeeded after retry"
                        );
                    }
                    return Ok(page);
                }
                Err(e) => e,
            };

            if !error.is_retryable() {
                return Err(error);
            }

            if attempt >= policy.max_retries {
                warn!(
                    collection_type = query.collection_type.as_str(),
                    offset = query.offset,
                    attempts = attempt + 1,
                    error = %error,
                    "Giving up after max retries"
                );
                return Err(FetchError::RetriesExhausted {
                    attempts: attempt + 1,
                    source: Box::new(error),
                });
            }

            let delay = policy.backoff_delay(attempt);
            warn!(
                collection_type = query.collection_type.as_str(),
                offset = query.offset,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Request failed, retrying after delay"
            );

            tokio::select! {
                biased;
                _ = ctx.cancel_token().cancelled() => return Err(FetchError::Cancelled),
                _ = sleep(delay) => {}
            }

            attempt += 1;
        }
    }

    async fn attempt_once(&self, ctx: &FetchContext, query: &PageQuery) -> Result<PageResult> {
        if ctx.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let _permit = ctx.admit().await?;

        tokio::select! {
            biased;
            _ = ctx.cancel_token().cancelled() => Err(FetchError::Cancelled),
            result = self.fetch_page_once(query) => result,
        }
    }
}
