//! Credential store abstraction.
//!
//! The authentication flow depends only on this trait, so any keyed record
//! store that enforces username uniqueness itself can back it.

use std::future::Future;

use thiserror::Error;

use crate::db::{NewUser, User};

/// Errors reported by a credential store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store's uniqueness constraint on username was violated.
    #[error("username already exists")]
    UniqueViolation,

    /// Any other persistence failure.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Keyed user record store.
///
/// `insert` must report a duplicate username as
/// [`StoreError::UniqueViolation`] atomically; callers treat that signal as
/// authoritative and any earlier lookup as advisory.
pub trait CredentialStore: Send + Sync {
    /// Find a user by username.
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Insert a new user record.
    fn insert(&self, new_user: &NewUser) -> impl Future<Output = Result<User, StoreError>> + Send;
}
