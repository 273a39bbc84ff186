//! Error types and Result alias for the riskdesk engine

use thiserror::Error;

/// Main error type for the riskdesk engine
///
/// Every variant aborts the enclosing operation with zero committed state
/// change; there is no partial commit and no internal retry.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Invalid state: {0}")]
    State(String),

    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(err.to_string())
    }
}
