//! HTTP transport seam.
//!
//! The client never talks to the network directly: every request goes through
//! a [`Transport`], which performs exactly one exchange and reports the raw
//! status and body. [`ReqwestTransport`] is the default implementation.

use crate::error::{BoxError, FetchError, Result};
use async_trait::async_trait;
use reqwest::{Client, Request};
use std::time::Duration;

/// Raw outcome of one completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs a single fully-built request
///
/// Connection, timeout and DNS failures are reported as `Err`; any status
/// code the server answers with is an `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> std::result::Result<RawResponse, BoxError>;
}

/// Transport backed by a `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Wrap an existing client; its own timeout settings apply
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: Request) -> std::result::Result<RawResponse, BoxError> {
        let response = self.client.execute(request).await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
