//! From trait implementations for FoldwiseError conversions

use super::types::FoldwiseError;

impl From<std::io::Error> for FoldwiseError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for FoldwiseError {
    fn from(error: serde_json::Error) -> Self {
        Self::json(error.to_string())
    }
}

impl From<reqwest::Error> for FoldwiseError {
    fn from(error: reqwest::Error) -> Self {
        let status_code = error.status().map(|s| s.as_u16());
        let url = error.url().map(|u| u.to_string());
        Self::Http {
            message: error.to_string(),
            url,
            status_code,
            context: None,
        }
    }
}

impl From<toml::de::Error> for FoldwiseError {
    fn from(error: toml::de::Error) -> Self {
        Self::config(format!("Failed to parse TOML config: {}", error))
    }
}

impl From<serde_yaml::Error> for FoldwiseError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::config(format!("Failed to parse YAML config: {}", error))
    }
}

impl From<ndarray::ShapeError> for FoldwiseError {
    fn from(error: ndarray::ShapeError) -> Self {
        Self::invalid_input(format!("Shape mismatch: {}", error))
    }
}
