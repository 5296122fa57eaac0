//! Bangumi API v0 access.
//!
//! Request building, status classification and retry for single pages of a
//! user's collection. The HTTP layer sits behind [`Transport`] so the engine
//! can run against a scripted backend.

pub mod client;
pub mod retry;
pub mod transport;
pub mod types;

pub use client::{ClientConfig, CollectionClient, DEFAULT_BASE_URL};
pub use retry::RetryPolicy;
pub use transport::{RawResponse, ReqwestTransport, Transport};
pub use types::*;
