//! Error types for the college management system.

use thiserror::Error;

/// Result type alias using the core Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for college operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing, malformed, expired, or badly signed credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role does not permit the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
