//! Shared state for nested fan-out.
//!
//! A [`FetchContext`] travels down from the coordinator through every
//! orchestrator to each page request. It carries the cancellation token for
//! the current subtree and the admission limiter shared by the whole call.

use crate::error::{FetchError, Result};
use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Cancellation scope and admission limiter for one fetch call
#[derive(Debug, Clone)]
pub(crate) struct FetchContext {
    cancel: CancellationToken,
    limiter: Arc<Semaphore>,
}

impl FetchContext {
    /// New root context admitting at most `concurrency_limit` requests at once
    pub(crate) fn new(cancel: CancellationToken, concurrency_limit: usize) -> Self {
        Self {
            cancel,
            limiter: Arc::new(Semaphore::new(concurrency_limit.max(1))),
        }
    }

    /// Nested scope: cancelled with its parent, but cancelling it leaves the parent alone.
    /// The limiter is shared.
    pub(crate) fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            limiter: Arc::clone(&self.limiter),
        }
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for an admission slot, giving up if the scope is cancelled first
    pub(crate) async fn admit(&self) -> Result<SemaphorePermit<'_>> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled),
            permit = self.limiter.acquire() => permit.map_err(|_| FetchError::Cancelled),
        }
    }

    #[cfg(test)]
    pub(crate) fn available_permits(&self) -> usize {
        self.limiter.available_permits()
    }
}

/// Wait for every task, cancelling the scope on the first failure
///
/// Returns the first error observed. Siblings are left to notice the
/// cancellation and wind down; their own errors (normally `Cancelled`) are
/// dropped.
pub(crate) async fn join_first_error(
    mut tasks: JoinSet<Result<()>>,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut first_error = None;

    while let Some(joined) = tasks.join_next().await {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(FetchError::Cancelled),
        };

        if let Err(e) = outcome {
            if first_error.is_none() {
                debug!(error = %e, remaining = tasks.len(), "Task failed, cancelling siblings");
                cancel.cancel();
                first_error = Some(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
