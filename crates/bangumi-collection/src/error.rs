//! Error types and failure classification.
//!
//! Every fallible operation in the library returns [`FetchError`]. The
//! classifier half of this module decides which failures are worth another
//! attempt: rate limiting, server faults and transport failures are retried,
//! everything else surfaces immediately.

use thiserror::Error;

/// Boxed error produced by a transport implementation
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, FetchError>;

/// Failure of a collection fetch
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("user id cannot be empty")]
    EmptyIdentifier,

    #[error("invalid user id")]
    InvalidIdentifier,

    #[error("unauthorized: invalid or expired access token")]
    Unauthorized,

    #[error("forbidden: access denied")]
    Forbidden,

    #[error("rate limited: too many requests")]
    RateLimited,

    #[error("server error (HTTP {status})")]
    ServerFault { status: u16 },

    #[error("unexpected http status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("network failed: {source}")]
    Transport {
        #[source]
        source: BoxError,
    },

    #[error("failed to parse response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },

    #[error("max retries exceeded after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<FetchError>,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid client configuration: {message}")]
    Config { message: String },
}

impl FetchError {
    /// Whether another attempt of the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::RateLimited | FetchError::ServerFault { .. } | FetchError::Transport { .. }
        )
    }

    /// The error that caused retries to give up, or `self` for any other kind
    pub fn last_cause(&self) -> &FetchError {
        match self {
            FetchError::RetriesExhausted { source, .. } => source,
            other => other,
        }
    }

    pub(crate) fn transport(source: impl Into<BoxError>) -> Self {
        FetchError::Transport {
            source: source.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        FetchError::Config {
            message: message.into(),
        }
    }
}

/// Classify a completed HTTP exchange by its status code
///
/// Statuses below 400 count as success; the body is only kept for
/// otherwise unclassified client errors.
pub fn classify_status(status: u16, body: &[u8]) -> Result<()> {
    match status {
        404 => Err(FetchError::InvalidIdentifier),
        401 => Err(FetchError::Unauthorized),
        403 => Err(FetchError::Forbidden),
        429 => Err(FetchError::RateLimited),
        s if s >= 500 => Err(FetchError::ServerFault { status: s }),
        s if s >= 400 => Err(FetchError::UnexpectedStatus {
            status: s,
            body: String::from_utf8_lossy(body).into_owned(),
        }),
        _ => Ok(()),
    }
}
