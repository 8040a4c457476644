use std::path::Path;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum UpdateError {
    #[error("Failed to access file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read stdin: {source}")]
    StdinRead {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize response JSON: {source}")]
    ResponseSerialization {
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Invalid input glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("File '{path}' is busy: another rewrite is in progress")]
    ResourceBusy { path: String },

    #[error("File '{path}' changed while it was being rewritten")]
    PathChanged { path: String },

    #[error("Script content changed since it was read. Expected hash '{expected_hash}', got '{actual_hash}'")]
    PreconditionFailed {
        expected_hash: String,
        actual_hash: String,
    },
}

impl UpdateError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let (error_type, suggestion) = match self {
            Self::Io { .. } | Self::StdinRead { .. } => ("io_error", None),
            Self::ResponseSerialization { .. } => ("serialization_error", None),
            Self::InvalidRequest { .. } => ("invalid_request", None),
            Self::InvalidGlob { .. } => (
                "invalid_glob",
                Some("Use a valid glob pattern such as 'scripts/*.sh'".to_string()),
            ),
            Self::ResourceBusy { .. } => (
                "resource_busy",
                Some("Retry after the other rewrite of this file completes".to_string()),
            ),
            Self::PathChanged { .. } | Self::PreconditionFailed { .. } => (
                "precondition_failed",
                Some("Re-run 'usacloud-update convert --write' on the current file".to_string()),
            ),
        };

        ErrorResponse {
            error: ErrorBody {
                r#type: error_type.to_string(),
                message: self.to_string(),
                suggestion,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub r#type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}
