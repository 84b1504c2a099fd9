//! Constructor methods for FoldwiseError

use super::types::FoldwiseError;

impl FoldwiseError {
    /// Create a capability mismatch error
    pub fn capability(estimator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Capability {
            estimator: estimator.into(),
            message: message.into(),
            context: None,
        }
    }

    /// Create an invalid hyperparameter error
    pub fn invalid_configuration(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            parameter: parameter.into(),
            message: message.into(),
            context: None,
        }
    }

    /// Create an estimator fit/predict error
    pub fn estimator(estimator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Estimator {
            estimator: estimator.into(),
            message: message.into(),
            context: None,
        }
    }

    /// Create a server rejection error
    pub fn server_rejection(code: Option<String>, message: impl Into<String>) -> Self {
        Self::ServerRejection {
            code,
            message: message.into(),
            additional_information: None,
            context: None,
        }
    }

    /// Create a not-found error for a remote resource
    pub fn not_found(resource_type: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.to_string(),
            context: None,
        }
    }

    /// Create an invalid task error
    pub fn invalid_task(message: impl Into<String>) -> Self {
        Self::InvalidTask {
            message: message.into(),
            context: None,
        }
    }

    /// Create an ARFF parse error
    pub fn arff(line: usize, message: impl Into<String>) -> Self {
        Self::Arff {
            line,
            message: message.into(),
            context: None,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create an IO error with message
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
            context: None,
        }
    }

    /// Create an IO error with path
    pub fn io_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
            context: None,
        }
    }

    /// Create a JSON error with message
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
            context: None,
        }
    }

    /// Create an HTTP error with message
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
            url: None,
            status_code: None,
            context: None,
        }
    }

    /// Create an HTTP error with status code
    pub fn http_with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self::Http {
            message: message.into(),
            url: None,
            status_code: Some(status_code),
            context: None,
        }
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
            context: None,
        }
    }

    /// Create an invalid input error with field
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
            context: None,
        }
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            context: None,
        }
    }

    /// Add context to any error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let ctx = Some(context.into());
        match &mut self {
            Self::Capability { context: c, .. }
            | Self::InvalidConfiguration { context: c, .. }
            | Self::Estimator { context: c, .. }
            | Self::ServerRejection { context: c, .. }
            | Self::NotFound { context: c, .. }
            | Self::InvalidTask { context: c, .. }
            | Self::Arff { context: c, .. }
            | Self::Config { context: c, .. }
            | Self::Io { context: c, .. }
            | Self::Json { context: c, .. }
            | Self::Http { context: c, .. }
            | Self::InvalidInput { context: c, .. }
            | Self::Other { context: c, .. } => *c = ctx,
        }
        self
    }
}
