//! UnifiedError trait implementation for FoldwiseError

use super::types::{FoldwiseError, UnifiedError};

impl UnifiedError for FoldwiseError {
    fn error_code(&self) -> &str {
        match self {
            Self::Capability { .. } => "FOLDWISE_CAPABILITY",
            Self::InvalidConfiguration { .. } => "FOLDWISE_INVALID_CONFIGURATION",
            Self::Estimator { .. } => "FOLDWISE_ESTIMATOR",
            Self::ServerRejection { .. } => "FOLDWISE_SERVER_REJECTION",
            Self::NotFound { .. } => "FOLDWISE_NOT_FOUND",
            Self::InvalidTask { .. } => "FOLDWISE_INVALID_TASK",
            Self::Arff { .. } => "FOLDWISE_ARFF",
            Self::Config { .. } => "FOLDWISE_CONFIG",
            Self::Io { .. } => "FOLDWISE_IO",
            Self::Json { .. } => "FOLDWISE_JSON",
            Self::Http { .. } => "FOLDWISE_HTTP",
            Self::InvalidInput { .. } => "FOLDWISE_INVALID_INPUT",
            Self::Other { .. } => "FOLDWISE_OTHER",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Capability { message, .. } => message,
            Self::InvalidConfiguration { message, .. } => message,
            Self::Estimator { message, .. } => message,
            Self::ServerRejection { message, .. } => message,
            Self::NotFound { id, .. } => id,
            Self::InvalidTask { message, .. } => message,
            Self::Arff { message, .. } => message,
            Self::Config { message, .. } => message,
            Self::Io { message, .. } => message,
            Self::Json { message, .. } => message,
            Self::Http { message, .. } => message,
            Self::InvalidInput { message, .. } => message,
            Self::Other { message, .. } => message,
        }
    }

    fn context(&self) -> Option<&str> {
        match self {
            Self::Capability { context, .. }
            | Self::InvalidConfiguration { context, .. }
            | Self::Estimator { context, .. }
            | Self::ServerRejection { context, .. }
            | Self::NotFound { context, .. }
            | Self::InvalidTask { context, .. }
            | Self::Arff { context, .. }
            | Self::Config { context, .. }
            | Self::Io { context, .. }
            | Self::Json { context, .. }
            | Self::Http { context, .. }
            | Self::InvalidInput { context, .. }
            | Self::Other { context, .. } => context.as_deref(),
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status_code, .. } => {
                matches!(status_code, None | Some(429) | Some(502) | Some(503) | Some(504))
            }
            _ => false,
        }
    }
}
