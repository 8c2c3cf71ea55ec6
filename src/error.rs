// region:    --- Imports
use crate::retry::classifier::{is_connection_error, NetworkStatus};
use thiserror::Error;

// endregion: --- Imports

// region:    --- Backend Error
/// Failure raised by an external backend (document store or identity provider).
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error reported by the backend with its own status code
    #[error("{message}")]
    Status { code: String, message: String },

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("No document to update: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Malformed document {collection}/{id}: {source}")]
    Decode {
        collection: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl BackendError {
    pub fn status(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Status {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Structured error code, when the backend provides one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Status { code, .. } => Some(code),
            Self::Database(err) => sqlx_code(err),
            Self::NotFound { .. } => Some("not-found"),
            Self::Decode { .. } => Some("data-loss"),
        }
    }
}

fn sqlx_code(err: &sqlx::Error) -> Option<&'static str> {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => Some("unavailable"),
        sqlx::Error::PoolTimedOut => Some("deadline-exceeded"),
        sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => Some("cancelled"),
        sqlx::Error::RowNotFound => Some("not-found"),
        sqlx::Error::Database(_) => Some("invalid-argument"),
        _ => None,
    }
}
// endregion: --- Backend Error

// region:    --- Admin Error
pub const CONNECTION_FAILED_MESSAGE: &str =
    "Connection failed. If the problem persists, please check your internet connection or VPN.";

/// User-facing failure returned by every admin operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error(
        "Connection failed. If the problem persists, please check your internet connection or VPN."
    )]
    Connection,

    #[error("{0}")]
    NotFound(String),

    #[error("Access denied. Admin privileges required.")]
    AccessDenied,

    #[error("Report has already been resolved")]
    AlreadyResolved,

    /// Request input the admin API cannot act on
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Failed(String),

    #[error("An unexpected error occurred. Please try again.")]
    Unexpected,
}

impl AdminError {
    /// Collapses a backend failure into the message shown to staff.
    pub fn from_backend(err: &BackendError, network: &NetworkStatus) -> Self {
        if is_connection_error(err, network) {
            return Self::Connection;
        }
        if let BackendError::NotFound { .. } = err {
            return Self::NotFound(err.to_string());
        }
        let message = err.to_string();
        if message.trim().is_empty() {
            Self::Unexpected
        } else {
            Self::Failed(message)
        }
    }
}
// endregion: --- Admin Error

// endregion: --- Tests
