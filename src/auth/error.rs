//! Errors produced by the authentication flow.

use thiserror::Error;

use super::password::PasswordError;
use super::token::TokenError;
use super::validation::ValidationError;
use crate::db::StoreError;

/// Authentication flow errors.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Input failed validation. Carries field-level messages.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The username is already taken.
    #[error("Username already taken. Please choose a different one.")]
    Conflict,

    /// Unknown username or wrong password; the two are indistinguishable.
    #[error("Invalid username or password.")]
    InvalidCredentials,

    /// The credential store failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Hashing or hash verification failed.
    #[error("hashing error: {0}")]
    Hashing(#[from] PasswordError),

    /// Token issuance failed.
    #[error("token error: {0}")]
    Token(#[from] TokenError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation => AuthError::Conflict,
            StoreError::Storage(msg) => AuthError::Storage(msg),
        }
    }
}
