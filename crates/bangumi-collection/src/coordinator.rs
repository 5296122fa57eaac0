//! Public fetch operations.
//!
//! [`CollectionClient::fetch`] runs one pagination per requested collection
//! type and merges everything into a single list. All runs of one call share
//! one admission limiter, so the number of requests in flight never exceeds
//! the configured concurrency limit.

use crate::api::types::PageQuery;
use crate::api::CollectionClient;
use crate::error::{FetchError, Result};
use crate::fanout::{self, FetchContext};
use shared::{CollectionType, PageResult, Subject, SubjectType};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::info;

fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(FetchError::EmptyIdentifier);
    }
    Ok(())
}

impl CollectionClient {
    /// Fetch every entry of the given collection types
    ///
    /// Either the complete merged list is returned or the first error; no
    /// partial results. Entry order is unspecified.
    pub async fn fetch(
        &self,
        user_id: &str,
        subject_type: SubjectType,
        collection_types: &[CollectionType],
    ) -> Result<Vec<Subject>> {
        self.fetch_with_cancel(&CancellationToken::new(), user_id, subject_type, collection_types)
            .await
    }

    /// Like [`fetch`](Self::fetch), aborting with `Cancelled` once `cancel` fires
    pub async fn fetch_with_cancel(
        &self,
        cancel: &CancellationToken,
        user_id: &str,
        subject_type: SubjectType,
        collection_types: &[CollectionType],
    ) -> Result<Vec<Subject>> {
        validate_user_id(user_id)?;

        let ctx = FetchContext::new(cancel.child_token(), self.config.concurrency_limit);
        let subjects = Arc::new(Mutex::new(Vec::new()));
        let mut tasks = JoinSet::new();

        for &collection_type in collection_types {
            let client = self.clone();
            let ctx = ctx.clone();
            let subjects = Arc::clone(&subjects);
            let user_id = user_id.to_string();

            tasks.spawn(async move {
                let result = client
                    .fetch_all_pages(&ctx, &user_id, subject_type, collection_type)
                    .await?;
                subjects.lock().await.extend(result);
                Ok::<_, FetchError>(())
            });
        }

        fanout::join_first_error(tasks, ctx.cancel_token()).await?;

        let subjects = std::mem::take(&mut *subjects.lock().await);
        info!(
            user_id = %user_id,
            subject_type = subject_type.as_str(),
            collection_types = collection_types.len(),
            subjects = subjects.len(),
            "Fetched collections"
        );

        Ok(subjects)
    }

    /// Fetch a single page
    ///
    /// `limit` is clamped into `[1, 50]` and a negative `offset` becomes 0.
    /// The request is retried like any page of [`fetch`](Self::fetch).
    pub async fn fetch_page(
        &self,
        user_id: &str,
        subject_type: SubjectType,
        collection_type: CollectionType,
        limit: i64,
        offset: i64,
    ) -> Result<PageResult> {
        self.fetch_page_with_cancel(
            &CancellationToken::new(),
            user_id,
            subject_type,
            collection_type,
            limit,
            offset,
        )
        .await
    }

    /// Like [`fetch_page`](Self::fetch_page), aborting with `Cancelled` once `cancel` fires
    pub async fn fetch_page_with_cancel(
        &self,
        cancel: &CancellationToken,
        user_id: &str,
        subject_type: SubjectType,
        collection_type: CollectionType,
        limit: i64,
        offset: i64,
    ) -> Result<PageResult> {
        validate_user_id(user_id)?;

        let query = PageQuery::new(user_id, subject_type, collection_type, limit, offset);
        let ctx = FetchContext::new(cancel.child_token(), self.config.concurrency_limit);
        self.fetch_with_retry(&ctx, &query).await
    }
}
