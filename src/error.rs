// Error taxonomy for the console

use reqwest::StatusCode;
use thiserror::Error;

use crate::forms::FieldErrors;
use crate::view::ViewError;

/// Failure of a single HTTP exchange with the operations API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unauthorized ({status})")]
    Unauthorized {
        status: u16,
        message: Option<String>,
    },

    #[error("request rejected ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    #[error("server error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Server {
        status: u16,
        message: Option<String>,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-success status, carrying the optional server message.
    pub fn from_status(status: StatusCode, message: Option<String>) -> Self {
        let code = status.as_u16();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized {
                status: code,
                message,
            },
            s if s.is_client_error() => ApiError::Rejected {
                status: code,
                message,
            },
            _ => ApiError::Server {
                status: code,
                message,
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::Unauthorized { status, .. }
            | ApiError::Rejected { status, .. }
            | ApiError::Server { status, .. } => Some(*status),
            ApiError::Decode(_) => None,
        }
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message, .. }
            | ApiError::Rejected { message, .. }
            | ApiError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Text shown to the operator: the server's message when it sent one,
    /// otherwise the per-action fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// Session-level failures.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    LoginFailed(String),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("token storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Outcome of a controller operation that did not succeed.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("cancelled by operator")]
    Cancelled,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no entity selected")]
    NoSelection,

    #[error(transparent)]
    View(#[from] ViewError),
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
