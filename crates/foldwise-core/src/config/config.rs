//! Main configuration structure

use super::logging_config::LoggingConfig;
use super::timeouts::TimeoutConfig;
use crate::error::{FoldwiseError, FoldwiseResult};
use serde::{Deserialize, Serialize};

/// Default service endpoint (JSON flavour of the REST API)
pub const DEFAULT_SERVER: &str = "https://www.openml.org/api/v1/json";

/// Default number of entries requested per list page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the service API
    pub server: String,
    /// API key sent with every request; required for publishing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// HTTP timeouts
    pub timeouts: TimeoutConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Page size used when a list call does not specify one
    pub default_page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            api_key: None,
            timeouts: TimeoutConfig::default(),
            logging: LoggingConfig::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Create a configuration pointing at `server`
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Default::default()
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the timeouts
    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Server URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.server.trim_end_matches('/')
    }

    /// Merge another configuration into this one.
    ///
    /// Values in `other` that still hold their defaults do not override.
    pub fn merge(&mut self, other: Config) {
        if !other.server.is_empty() && other.server != DEFAULT_SERVER {
            self.server = other.server;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.timeouts != TimeoutConfig::default() {
            self.timeouts = other.timeouts;
        }
        let default_logging = LoggingConfig::default();
        if other.logging.level != default_logging.level {
            self.logging.merge(LoggingConfig {
                level: other.logging.level,
                format: String::new(),
            });
        }
        if other.logging.format != default_logging.format {
            self.logging.merge(LoggingConfig {
                level: String::new(),
                format: other.logging.format,
            });
        }
        if other.default_page_size != DEFAULT_PAGE_SIZE {
            self.default_page_size = other.default_page_size;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> FoldwiseResult<()> {
        if self.server.trim().is_empty() {
            return Err(FoldwiseError::config("Server URL must not be empty"));
        }
        if !(self.server.starts_with("http://") || self.server.starts_with("https://")) {
            return Err(FoldwiseError::config(format!(
                "Server URL must use http or https: {}",
                self.server
            )));
        }
        if let Some(key) = &self.api_key {
            if key.trim().is_empty() {
                return Err(FoldwiseError::config("API key must not be blank"));
            }
        }
        if self.default_page_size == 0 {
            return Err(FoldwiseError::config("default_page_size must be greater than 0"));
        }
        self.timeouts
            .validate()
            .map_err(|e| FoldwiseError::config_with_context(e, "Validating timeouts"))?;
        self.logging
            .validate()
            .map_err(|e| FoldwiseError::config_with_context(e, "Validating logging"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url(), DEFAULT_SERVER);
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let config = Config::new("http://localhost:8080/api/v1/json/");
        assert_eq!(config.base_url(), "http://localhost:8080/api/v1/json");
    }

    #[test]
    fn test_merge_keeps_values_when_other_is_default() {
        let mut config = Config::new("http://test.local").with_api_key("abc");
        config.merge(Config::default());
        assert_eq!(config.server, "http://test.local");
        assert_eq!(config.api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_merge_overrides_explicit_values() {
        let mut config = Config::default();
        let mut other = Config::new("http://other.local").with_api_key("xyz");
        other.default_page_size = 25;
        other.logging.level = "debug".to_string();
        config.merge(other);
        assert_eq!(config.server, "http://other.local");
        assert_eq!(config.api_key.as_deref(), Some("xyz"));
        assert_eq!(config.default_page_size, 25);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "compact");
    }

    #[test]
    fn test_validate_rejects_bad_server() {
        assert!(Config::new("").validate().is_err());
        assert!(Config::new("ftp://example.org").validate().is_err());
    }
}
