//! Configuration management commands

use crate::console::CliConsole;
use foldwise_core::config::{Config, default_config_path};
use foldwise_core::error::{FoldwiseError, FoldwiseResult, OptionExt, ResultExt};
use std::path::{Path, PathBuf};

/// The file `config init` writes to
pub fn target_path(config_file: Option<&Path>) -> FoldwiseResult<PathBuf> {
    config_file
        .map(Path::to_path_buf)
        .or_else(default_config_path)
        .context("No config directory; pass --config-file")
}

/// Print the effective configuration
pub fn show(config: &Config, console: &CliConsole) {
    console.print_header("Configuration");
    console.field("server", &config.server);
    console.field(
        "api key",
        config.api_key.as_deref().map_or("(not set)".to_string(), mask),
    );
    console.field("connect", format!("{}s", config.timeouts.connection_timeout_secs));
    console.field("request", format!("{}s", config.timeouts.request_timeout_secs));
    console.field("log level", &config.logging.level);
    console.field("log format", &config.logging.format);
    console.field("page size", config.default_page_size);
}

/// Write a default configuration file
pub async fn init(path: &Path, force: bool, console: &CliConsole) -> FoldwiseResult<()> {
    console.print_header("Configuration Initialization");

    if path.exists() && !force {
        console.info("Use --force to overwrite");
        return Err(FoldwiseError::config(format!(
            "Configuration file already exists: {}",
            path.display()
        )));
    }

    let content = render(&Config::default(), path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            FoldwiseError::io_with_path(e.to_string(), parent.display().to_string())
        })?;
    }
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write configuration file {}", path.display()))?;

    console.success(&format!("Created configuration file: {}", path.display()));
    console.info("Add your api_key to publish runs");
    Ok(())
}

/// Serialize in the format implied by the file extension
fn render(config: &Config, path: &Path) -> FoldwiseResult<String> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(serde_json::to_string_pretty(config)?),
        _ => toml::to_string_pretty(config).context("Failed to serialize configuration"),
    }
}

fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use foldwise_core::config::ConfigLoader;

    #[tokio::test]
    async fn test_init_writes_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let console = CliConsole::new(false);

        init(&path, false, &console).await.unwrap();
        let loaded = ConfigLoader::new()
            .with_env_lookup(|_| None)
            .with_file(&path)
            .load()
            .unwrap();
        assert_eq!(loaded, Config::default());

        assert!(init(&path, false, &console).await.is_err());
        init(&path, true, &console).await.unwrap();
    }

    #[tokio::test]
    async fn test_init_reports_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        let console = CliConsole::new(false);

        let err = init(dir.path(), true, &console).await.unwrap_err();
        assert!(err.to_string().contains("Failed to write configuration file"));
    }

    #[test]
    fn test_target_path_prefers_explicit_file() {
        let path = target_path(Some(Path::new("custom.json"))).unwrap();
        assert_eq!(path, PathBuf::from("custom.json"));
    }

    #[test]
    fn test_mask_hides_middle_of_key() {
        assert_eq!(mask("abcd"), "****");
        assert_eq!(mask("0123456789abcdef"), "0123…cdef");
    }
}
