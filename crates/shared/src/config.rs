//! Configuration management for the bangumi-collection project.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Bangumi API settings
    #[serde(default)]
    pub bangumi: BangumiConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Bangumi API client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BangumiConfig {
    /// API base URL (without the `/users/...` path)
    pub base_url: String,

    /// User-Agent sent with every request (required by the API)
    pub user_agent: String,

    /// Optional access token for private collections
    pub access_token: Option<String>,

    /// Maximum number of page requests in flight at once
    pub concurrency_limit: usize,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Maximum retries for transient failures
    pub max_retries: u32,

    /// Base retry delay in milliseconds (doubled on every retry)
    pub retry_interval_ms: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl Default for BangumiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.bgm.tv/v0".to_string(),
            user_agent: "bangumi-collection/0.1.0".to_string(),
            access_token: None,
            concurrency_limit: 10,
            request_timeout_secs: 30,
            max_retries: 3,
            retry_interval_ms: 1000,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load configuration from a TOML file or create default if not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::from_file(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            Self::default()
        })
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Get the path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.logging.log_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bangumi.base_url, "https://api.bgm.tv/v0");
        assert_eq!(config.bangumi.concurrency_limit, 10);
        assert_eq!(config.bangumi.request_timeout_secs, 30);
        assert_eq!(config.bangumi.max_retries, 3);
        assert_eq!(config.bangumi.retry_interval_ms, 1000);
        assert_eq!(config.bangumi.access_token, None);
        assert_eq!(config.logging.default_level, "info");
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut original_config = Config::default();
        original_config.bangumi.access_token = Some("secret".to_string());
        original_config.bangumi.concurrency_limit = 4;
        original_config.save(&config_path)?;

        assert!(config_path.exists());

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.bangumi.base_url, original_config.bangumi.base_url);
        assert_eq!(loaded_config.bangumi.access_token.as_deref(), Some("secret"));
        assert_eq!(loaded_config.bangumi.concurrency_limit, 4);

        Ok(())
    }

    #[test]
    fn test_partial_config_fills_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[bangumi]\nuser_agent = \"me/my-project\"\nmax_retries = 0\n",
        )?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.bangumi.user_agent, "me/my-project");
        assert_eq!(config.bangumi.max_retries, 0);
        assert_eq!(config.bangumi.concurrency_limit, 10);
        assert!(config.logging.console);

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        // Should return default config without error
        assert_eq!(config.bangumi.user_agent, "bangumi-collection/0.1.0");
    }

    #[test]
    fn test_load_or_default_on_invalid_toml() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[bangumi\nbroken")?;

        assert!(Config::from_file(&config_path).is_err());
        let config = Config::load_or_default(&config_path);
        assert_eq!(config.bangumi.concurrency_limit, 10);

        Ok(())
    }
}
