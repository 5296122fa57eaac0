//! Fetching every page of one collection type.
//!
//! A 1-item probe learns the total, then one request per page of
//! [`PAGE_SIZE`] items is fanned out under the shared admission limiter.
//! The first failing page cancels its siblings and the whole run fails.

use crate::api::types::{PageQuery, PAGE_SIZE};
use crate::api::CollectionClient;
use crate::error::{FetchError, Result};
use crate::fanout::{self, FetchContext};
use shared::{CollectionType, Subject, SubjectType};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Offsets of every page needed to cover `total` items
pub fn page_offsets(total: u32) -> impl Iterator<Item = u32> {
    (0..total).step_by(PAGE_SIZE as usize)
}

impl CollectionClient {
    /// Fetch every entry of one collection type
    ///
    /// Result order follows page completion order, not server order.
    pub(crate) async fn fetch_all_pages(
        &self,
        ctx: &FetchContext,
        user_id: &str,
        subject_type: SubjectType,
        collection_type: CollectionType,
    ) -> Result<Vec<Subject>> {
        let probe = PageQuery::probe(user_id, subject_type, collection_type);
        let total = self.fetch_with_retry(ctx, &probe).await?.total;

        if total == 0 {
            debug!(
                user_id = %user_id,
                collection_type = collection_type.as_str(),
                "Collection is empty"
            );
            return Ok(Vec::new());
        }

        let ctx = ctx.child();
        let subjects = Arc::new(Mutex::new(Vec::new()));
        let mut tasks = JoinSet::new();

        for offset in page_offsets(total) {
            let client = self.clone();
            let ctx = ctx.clone();
            let subjects = Arc::clone(&subjects);
            let query = probe.page(offset);

            tasks.spawn(async move {
                let page = client.fetch_with_retry(&ctx, &query).await?;
                subjects.lock().await.extend(page.data);
                Ok::<_, FetchError>(())
            });
        }

        debug!(
            collection_type = collection_type.as_str(),
            total = total,
            pages = tasks.len(),
            "Dispatched page requests"
        );

        fanout::join_first_error(tasks, ctx.cancel_token()).await?;

        let subjects = std::mem::take(&mut *subjects.lock().await);
        info!(
            user_id = %user_id,
            subject_type = subject_type.as_str(),
            collection_type = collection_type.as_str(),
            total = total,
            fetched = subjects.len(),
            "Fetched collection"
        );

        Ok(subjects)
    }
}
