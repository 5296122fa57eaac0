//! Shared library for the bangumi-collection project.
//!
//! This crate provides common functionality used by the collection client
//! and its command-line program:
//! - Configuration management
//! - Domain models (subjects, collection states, pages)
//! - Logging infrastructure

pub mod config;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use config::{BangumiConfig, Config};
pub use logging::LogConfig;
pub use models::*;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
