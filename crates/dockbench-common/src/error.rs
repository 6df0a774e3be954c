//! Docker client error classification
//!
//! The Docker engine reports failures as HTTP status codes. Cleanup only
//! cares about a few categories, most importantly "not found", which a status
//! check reads as "already gone".

use thiserror::Error;

/// Docker client error categories for retry and cleanup logic
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Object does not exist (safe to treat as deleted)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Object is in use or in a conflicting state (retryable)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other error response from the engine
    #[error("Docker error {code}: {message}")]
    Status { code: u16, message: String },

    /// Connection or protocol failure before a response was received
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ClientError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Conflict(_) | ClientError::Transport(_) => true,
            ClientError::Status { code, .. } => *code >= 500,
            ClientError::NotFound(_) => false,
        }
    }

    /// HTTP status code, if the error came from an engine response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::NotFound(_) => Some(NOT_FOUND),
            ClientError::Conflict(_) => Some(CONFLICT),
            ClientError::Status { code, .. } => Some(*code),
            ClientError::Transport(_) => None,
        }
    }
}

const NOT_FOUND: u16 = 404;
const CONFLICT: u16 = 409;

/// Classify an engine error response by its HTTP status code.
pub fn classify_status(code: u16, message: impl Into<String>) -> ClientError {
    let message = message.into();
    match code {
        NOT_FOUND => ClientError::NotFound(message),
        CONFLICT => ClientError::Conflict(message),
        _ => ClientError::Status { code, message },
    }
}
