//! Concurrent client for Bangumi user collections.
//!
//! Fetches every entry of one or more collection states of a user by probing
//! each collection for its size and then requesting all pages in parallel
//! under one shared concurrency limit. Transient failures are retried with
//! exponential backoff; the first permanent failure aborts the whole call.

pub mod api;
pub mod coordinator;
pub mod error;
mod fanout;
pub mod pagination;

#[cfg(test)]
mod testing;

pub use api::{ClientConfig, CollectionClient, RetryPolicy, Transport};
pub use error::{FetchError, Result};
pub use shared::{CollectionType, PageResult, Subject, SubjectType};
pub use tokio_util::sync::CancellationToken;
