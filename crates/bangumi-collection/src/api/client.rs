//! Bangumi collections client and single-page fetching.

use super::retry::RetryPolicy;
use super::transport::{ReqwestTransport, Transport};
use super::types::{CollectionsResponse, PageQuery};
use crate::error::{classify_status, FetchError, Result};
use reqwest::header::{HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Method, Request, Url};
use shared::{BangumiConfig, PageResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.bgm.tv/v0";

/// Client settings
///
/// The `with_*` setters ignore out-of-range values and keep the previous
/// setting, so a zero concurrency limit or zero timeout never reaches the
/// engine.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root; requests go to `{base_url}/users/{id}/collections`
    pub base_url: String,
    /// Identifies the calling application (required by the API)
    pub user_agent: String,
    /// Bearer token, sent only when present
    pub access_token: Option<String>,
    /// Maximum page requests in flight for one fetch call
    pub concurrency_limit: usize,
    /// Per-request timeout of the default transport
    pub request_timeout: Duration,
    /// Retry behavior for transient failures
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: user_agent.into(),
            access_token: None,
            concurrency_limit: 10,
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the access token; an empty token clears it
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.access_token = if token.is_empty() { None } else { Some(token) };
        self
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        if limit > 0 {
            self.concurrency_limit = limit;
        }
        self
    }

    /// Only affects the default transport
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.request_timeout = timeout;
        }
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.retry.base_interval = interval;
        }
        self
    }
}

impl From<&BangumiConfig> for ClientConfig {
    fn from(config: &BangumiConfig) -> Self {
        let mut client_config = ClientConfig::new(config.user_agent.clone())
            .with_base_url(config.base_url.clone())
            .with_concurrency_limit(config.concurrency_limit)
            .with_request_timeout(Duration::from_secs(config.request_timeout_secs))
            .with_max_retries(config.max_retries)
            .with_retry_interval(Duration::from_millis(config.retry_interval_ms));

        if let Some(token) = &config.access_token {
            client_config = client_config.with_access_token(token.clone());
        }
        client_config
    }
}

/// Bangumi collections client
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct CollectionClient {
    transport: Arc<dyn Transport>,
    base_url: Url,
    user_agent: HeaderValue,
    authorization: Option<HeaderValue>,
    pub(crate) config: Arc<ClientConfig>,
}

impl CollectionClient {
    /// Create a client using the default reqwest transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client that sends every request through `transport`
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            return Err(FetchError::config("user agent is required"));
        }

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FetchError::config(format!("invalid base url {}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::config(format!(
                "base url cannot carry a path: {}",
                config.base_url
            )));
        }

        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| FetchError::config("user agent is not a valid header value"))?;

        let authorization = config
            .access_token
            .as_ref()
            .map(|token| {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| FetchError::config("access token is not a valid header value"))?;
                value.set_sensitive(true);
                Ok::<_, FetchError>(value)
            })
            .transpose()?;

        Ok(Self {
            transport,
            base_url,
            user_agent,
            authorization,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the GET request for one page
    pub(crate) fn build_request(&self, query: &PageQuery) -> Result<Request> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::config("base url cannot carry a path"))?
            .pop_if_empty()
            .extend(["users", query.user_id.as_str(), "collections"]);

        url.query_pairs_mut()
            .append_pair("subject_type", &query.subject_type.code().to_string())
            .append_pair("type", &query.collection_type.code().to_string())
            .append_pair("offset", &query.offset.to_string())
            .append_pair("limit", &query.limit.to_string());

        let mut request = Request::new(Method::GET, url);
        let headers = request.headers_mut();
        headers.insert(USER_AGENT, self.user_agent.clone());
        if let Some(authorization) = &self.authorization {
            headers.insert(AUTHORIZATION, authorization.clone());
        }

        Ok(request)
    }

    /// Perform exactly one request for `query`, without retrying
    pub(crate) async fn fetch_page_once(&self, query: &PageQuery) -> Result<PageResult> {
        let request = self.build_request(query)?;

        debug!(
            url = %request.url(),
            collection_type = query.collection_type.as_str(),
            offset = query.offset,
            limit = query.limit,
            "Making API request"
        );

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(FetchError::transport)?;

        classify_status(response.status, &response.body)?;

        let decoded: CollectionsResponse = serde_json::from_slice(&response.body)
            .map_err(|source| FetchError::Decode { source })?;

        Ok(decoded.into_page())
    }
}

impl std::fmt::Debug for CollectionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionClient")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("authenticated", &self.authorization.is_some())
            .field("concurrency_limit", &self.config.concurrency_limit)
            .finish()
    }
}
