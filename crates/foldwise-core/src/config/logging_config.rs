//! Logging configuration

use serde::{Deserialize, Serialize};

/// Logging configuration consumed by the CLI's subscriber setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    /// Log format (json, pretty, compact)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "warn".to_string()
    }

    fn default_format() -> String {
        "compact".to_string()
    }

    /// Merge with another logging config, preferring its non-empty values
    pub fn merge(&mut self, other: LoggingConfig) {
        if !other.level.is_empty() {
            self.level = other.level;
        }
        if !other.format.is_empty() {
            self.format = other.format;
        }
    }

    /// Check the level and format names
    pub fn validate(&self) -> Result<(), String> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        const FORMATS: [&str; 3] = ["json", "pretty", "compact"];
        if !LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(format!("Unknown log level '{}'", self.level));
        }
        if !FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(format!("Unknown log format '{}'", self.format));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: Self::default_format(),
        }
    }
}
