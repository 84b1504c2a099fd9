//! Configuration loading from files, environment and command line

use super::config::Config;
use crate::error::{FoldwiseError, FoldwiseResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Source of configuration data
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Configuration from a file (`.json`, `.toml`, `.yaml`/`.yml`)
    File(PathBuf),
    /// Configuration from `FOLDWISE_*` environment variables
    Environment,
    /// Configuration from command line arguments
    CommandLine(HashMap<String, String>),
    /// Default configuration
    Default,
}

/// Configuration loader with support for multiple sources.
///
/// Sources are applied in insertion order; later sources win.
pub struct ConfigLoader {
    sources: Vec<ConfigSource>,
    env: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new config loader reading the process environment
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            env: Box::new(|key| std::env::var(key).ok()),
        }
    }

    /// Replace the environment lookup, mainly for tests
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(lookup);
        self
    }

    /// Add a configuration source
    pub fn add_source(mut self, source: ConfigSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Add a file source
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.add_source(ConfigSource::File(path.as_ref().to_path_buf()))
    }

    /// Add environment variables source
    pub fn with_env(self) -> Self {
        self.add_source(ConfigSource::Environment)
    }

    /// Add command line arguments source
    pub fn with_args(self, args: HashMap<String, String>) -> Self {
        self.add_source(ConfigSource::CommandLine(args))
    }

    /// Add default configuration source
    pub fn with_defaults(self) -> Self {
        self.add_source(ConfigSource::Default)
    }

    /// Load configuration from all sources and validate the result
    pub fn load(self) -> FoldwiseResult<Config> {
        let mut config = Config::default();

        for source in &self.sources {
            let source_config = self.load_from_source(source)?;
            config.merge(source_config);
        }

        config.validate()?;
        tracing::debug!(server = %config.server, "configuration loaded");
        Ok(config)
    }

    fn load_from_source(&self, source: &ConfigSource) -> FoldwiseResult<Config> {
        match source {
            ConfigSource::File(path) => {
                tracing::debug!("Loading config from file: {}", path.display());
                load_from_file(path)
            }
            ConfigSource::Environment => {
                tracing::debug!("Loading config from environment");
                self.load_from_env()
            }
            ConfigSource::CommandLine(args) => {
                tracing::debug!("Loading config from command line");
                load_from_args(args)
            }
            ConfigSource::Default => Ok(Config::default()),
        }
    }

    fn load_from_env(&self) -> FoldwiseResult<Config> {
        let mut config = Config::default();
        let env = &self.env;

        if let Some(server) = env("FOLDWISE_SERVER") {
            config.server = server;
        }
        if let Some(api_key) = env("FOLDWISE_API_KEY") {
            config.api_key = Some(api_key);
        }
        if let Some(level) = env("FOLDWISE_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = env("FOLDWISE_LOG_FORMAT") {
            config.logging.format = format;
        }
        if let Some(secs) = env("FOLDWISE_CONNECT_TIMEOUT_SECS") {
            config.timeouts.connection_timeout_secs =
                parse_number("FOLDWISE_CONNECT_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = env("FOLDWISE_REQUEST_TIMEOUT_SECS") {
            config.timeouts.request_timeout_secs =
                parse_number("FOLDWISE_REQUEST_TIMEOUT_SECS", &secs)?;
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> FoldwiseResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| FoldwiseError::config(format!("Invalid {} value: '{}'", name, value)))
}

fn load_from_file(path: &Path) -> FoldwiseResult<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        FoldwiseError::config_with_context(
            format!("Failed to read config file: {}", e),
            format!("Reading configuration from '{}'", path.display()),
        )
    })?;

    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content)?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        _ => serde_json::from_str(&content).map_err(|e| {
            FoldwiseError::config_with_context(
                format!("Failed to parse JSON config: {}", e),
                format!("Deserializing JSON configuration from '{}'", path.display()),
            )
        })?,
    };

    Ok(config)
}

fn load_from_args(args: &HashMap<String, String>) -> FoldwiseResult<Config> {
    let mut config = Config::default();

    if let Some(server) = args.get("server") {
        config.server = server.clone();
    }
    if let Some(api_key) = args.get("api_key") {
        config.api_key = Some(api_key.clone());
    }
    if let Some(level) = args.get("log_level") {
        config.logging.level = level.clone();
    }
    if let Some(size) = args.get("page_size") {
        config.default_page_size = parse_number("page_size", size)?;
    }

    Ok(config)
}

/// Default config file location: `~/.config/foldwise/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("foldwise").join("config.toml"))
}

/// Load configuration from defaults, an optional file and the environment,
/// then apply command line overrides.
pub fn load_config(
    config_file: Option<&Path>,
    overrides: HashMap<String, String>,
) -> FoldwiseResult<Config> {
    let mut loader = ConfigLoader::new().with_defaults();
    match config_file {
        Some(path) => loader = loader.with_file(path),
        None => {
            if let Some(path) = default_config_path() {
                loader = loader.with_file(path);
            }
        }
    }
    loader.with_env().with_args(overrides).load()
}
