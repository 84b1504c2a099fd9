//! Core error types and traits for foldwise

use thiserror::Error;

/// Result type alias for foldwise operations
pub type FoldwiseResult<T> = Result<T, FoldwiseError>;

/// Uniform accessors shared by every error in the workspace.
pub trait UnifiedError: std::error::Error + Send + Sync {
    /// Stable code for programmatic handling
    fn error_code(&self) -> &str;

    /// Human-readable error message
    fn message(&self) -> &str;

    /// Optional context about where the error occurred
    fn context(&self) -> Option<&str> {
        None
    }

    /// Whether the failure is transient. Informational only: callers decide.
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C: std::fmt::Display>(self, context: C) -> FoldwiseResult<T>;

    /// Add context lazily (only evaluated on error)
    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> FoldwiseResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context<C: std::fmt::Display>(self, context: C) -> FoldwiseResult<T> {
        self.map_err(|e| FoldwiseError::other(format!("{}: {}", context, e)))
    }

    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> FoldwiseResult<T> {
        self.map_err(|e| FoldwiseError::other(format!("{}: {}", f(), e)))
    }
}

/// Extension trait for turning an `Option` into a `FoldwiseResult`
pub trait OptionExt<T> {
    /// Convert None into an error carrying `context`
    fn context<C: std::fmt::Display>(self, context: C) -> FoldwiseResult<T>;

    /// Convert None into an error with a lazily built message
    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> FoldwiseResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn context<C: std::fmt::Display>(self, context: C) -> FoldwiseResult<T> {
        self.ok_or_else(|| FoldwiseError::other(context.to_string()))
    }

    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> FoldwiseResult<T> {
        self.ok_or_else(|| FoldwiseError::other(f().to_string()))
    }
}

/// Main error type for foldwise
#[derive(Error, Debug, Clone)]
pub enum FoldwiseError {
    /// The model lacks an operation the task requires
    #[error("Capability error: {estimator}: {message}")]
    Capability {
        estimator: String,
        message: String,
        context: Option<String>,
    },

    /// A hyperparameter value rejected by the underlying algorithm
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        parameter: String,
        message: String,
        context: Option<String>,
    },

    /// Fit or predict failure inside an estimator
    #[error("Estimator error: {estimator}: {message}")]
    Estimator {
        estimator: String,
        message: String,
        context: Option<String>,
    },

    /// The remote service refused the request
    #[error("Server rejected request (code {}): {message}", .code.as_deref().unwrap_or("?"))]
    ServerRejection {
        code: Option<String>,
        message: String,
        additional_information: Option<String>,
        context: Option<String>,
    },

    /// A run, task, dataset or flow that does not exist remotely
    #[error("Not found: {resource_type} {id}")]
    NotFound {
        resource_type: String,
        id: String,
        context: Option<String>,
    },

    /// A task whose splits or labels are inconsistent
    #[error("Invalid task: {message}")]
    InvalidTask {
        message: String,
        context: Option<String>,
    },

    /// Malformed ARFF content
    #[error("ARFF error at line {line}: {message}")]
    Arff {
        line: usize,
        message: String,
        context: Option<String>,
    },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
        context: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        context: Option<String>,
    },

    /// Transport-level HTTP errors
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        url: Option<String>,
        status_code: Option<u16>,
        context: Option<String>,
    },

    /// Invalid input errors
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
        context: Option<String>,
    },

    /// Generic error with context
    #[error("Error: {message}")]
    Other {
        message: String,
        context: Option<String>,
    },
}

impl FoldwiseError {
    /// True for a capability mismatch
    pub fn is_capability(&self) -> bool {
        matches!(self, Self::Capability { .. })
    }

    /// True for a rejected hyperparameter value
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }

    /// True when the service refused the request
    pub fn is_server_rejection(&self) -> bool {
        matches!(self, Self::ServerRejection { .. })
    }

    /// True when the remote object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
