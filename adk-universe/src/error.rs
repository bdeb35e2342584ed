//! Error types for the `adk-universe` crate.

use thiserror::Error;

/// Errors that can occur while talking to a universe server.
#[derive(Debug, Error)]
pub enum UniverseError {
    /// The server URL or universe name is missing or malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The bearer token is missing, empty, or the store has not been initialized.
    #[error("Credential error: {0}")]
    CredentialError(String),

    /// An operation was called with malformed arguments.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// No response could be obtained from the server, even after retrying.
    #[error("Transport error: {message}")]
    TransportError {
        /// A description of the last network-level failure.
        message: String,
    },

    /// The server answered with a non-success HTTP status.
    #[error("Universe API error ({status}): {message}")]
    ApiError {
        /// The HTTP status code returned by the server.
        status: u16,
        /// The message extracted from the response body, or the status line.
        message: String,
    },
}

impl UniverseError {
    /// Returns the HTTP status code for [`UniverseError::ApiError`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error means no response was obtained at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportError { .. })
    }
}

/// A convenience result type for universe store operations.
pub type Result<T> = std::result::Result<T, UniverseError>;
