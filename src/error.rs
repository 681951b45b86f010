//! Error types for roleguard.

use thiserror::Error;

/// Common error type for service bootstrap (configuration, storage, I/O).
///
/// Request-level failures of the authentication core use
/// [`AuthError`](crate::auth::AuthError) instead.
#[derive(Error, Debug)]
pub enum RoleguardError {
    /// Database error.
    ///
    /// Errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for RoleguardError {
    fn from(e: sqlx::Error) -> Self {
        RoleguardError::Database(e.to_string())
    }
}

/// Result type alias for roleguard operations.
pub type Result<T> = std::result::Result<T, RoleguardError>;
