//! Configuration management for foldwise

#[allow(clippy::module_inception)] // config module in config directory is intentional
mod config;
mod loader;
mod logging_config;
mod timeouts;

pub use config::{Config, DEFAULT_PAGE_SIZE, DEFAULT_SERVER};
pub use loader::{ConfigLoader, ConfigSource, default_config_path, load_config};
pub use logging_config::LoggingConfig;
pub use timeouts::TimeoutConfig;
