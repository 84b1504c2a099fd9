//! Mapping of service error responses

use super::wire::ErrorEnvelope;
use crate::error::FoldwiseError;

/// Service error codes meaning "the requested object does not exist"
pub const NOT_FOUND_CODES: [&str; 6] = ["111", "112", "151", "152", "220", "221"];

/// Service error code for a listing without results
pub const NO_RESULTS_CODE: &str = "372";

/// An error response from the service
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ApiError {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
    pub additional_information: Option<String>,
}

impl ApiError {
    /// Build from a non-success status and the raw body
    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => Self {
                status,
                code: envelope.error.code,
                message: envelope.error.message,
                additional_information: envelope.error.additional_information,
            },
            Err(_) => Self {
                status,
                code: None,
                message: if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.trim().chars().take(500).collect()
                },
                additional_information: None,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
            || self
                .code
                .as_deref()
                .is_some_and(|code| NOT_FOUND_CODES.contains(&code))
    }

    pub fn is_no_results(&self) -> bool {
        self.code.as_deref() == Some(NO_RESULTS_CODE)
    }

    /// Convert, reporting missing objects as `NotFound { resource, id }`
    pub fn into_error(self, resource: &str, id: impl ToString) -> FoldwiseError {
        if self.is_not_found() {
            return FoldwiseError::not_found(resource, id);
        }
        self.into_rejection()
    }

    pub fn into_rejection(self) -> FoldwiseError {
        FoldwiseError::ServerRejection {
            code: self.code,
            message: self.message,
            additional_information: self.additional_information,
            context: Some(format!("HTTP status {}", self.status)),
        }
    }
}
