//! Registration and login.
//!
//! [`AuthService`] ties a [`CredentialStore`] to the password hasher and the
//! token service. Hashing runs on the blocking thread pool.

use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

use super::error::AuthError;
use super::password::{PasswordError, PasswordHasher};
use super::token::TokenService;
use super::validation::{LoginRequest, RegistrationRequest};
use crate::db::{CredentialStore, NewUser};

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    /// The stored username.
    pub username: String,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Signed session token.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Password hashed on first use, verified against when a login names an
/// unknown user so both failures cost one Argon2 run.
const DUMMY_PASSWORD: &str = "roleguard-dummy-password";

/// Authentication flow over a credential store.
pub struct AuthService<S> {
    store: S,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenService>,
    dummy_hash: Arc<OnceLock<String>>,
}

impl<S: Clone> Clone for AuthService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            hasher: Arc::clone(&self.hasher),
            tokens: Arc::clone(&self.tokens),
            dummy_hash: Arc::clone(&self.dummy_hash),
        }
    }
}

impl<S: CredentialStore> AuthService<S> {
    /// Create a new authentication service.
    pub fn new(store: S, hasher: PasswordHasher, tokens: Arc<TokenService>) -> Self {
        Self {
            store,
            hasher: Arc::new(hasher),
            tokens,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// The token service used for issuance.
    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// The underlying credential store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a new user.
    ///
    /// The username lookup before insert is only a fast path; a unique
    /// violation reported by the store is what decides a conflict.
    pub async fn register(&self, request: RegistrationRequest) -> Result<RegisteredUser, AuthError> {
        let registration = request.into_registration()?;

        if self
            .store
            .find_by_username(&registration.username)
            .await?
            .is_some()
        {
            warn!(username = %registration.username, "Registration rejected: username taken");
            return Err(AuthError::Conflict);
        }

        let hasher = Arc::clone(&self.hasher);
        let password = registration.password;
        let password_hash = run_blocking(move || hasher.hash(&password)).await?;

        let new_user = NewUser::new(registration.username, password_hash, registration.role);
        let user = self.store.insert(&new_user).await.map_err(|e| {
            let err = AuthError::from(e);
            if matches!(err, AuthError::Conflict) {
                warn!(username = %new_user.username, "Registration rejected: username taken");
            }
            err
        })?;

        info!(user_id = user.id, username = %user.username, role = %user.role, "User registered");

        Ok(RegisteredUser {
            username: user.username,
        })
    }

    /// Authenticate a user and issue a session token.
    pub async fn login(&self, request: LoginRequest) -> Result<IssuedToken, AuthError> {
        let credentials = request.into_credentials()?;

        let Some(user) = self.store.find_by_username(&credentials.username).await? else {
            self.verify_dummy(credentials.password).await?;
            warn!(username = %credentials.username, "Login failed: unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        let hasher = Arc::clone(&self.hasher);
        let password = credentials.password;
        let stored_hash = user.password_hash.clone();
        let matches = run_blocking(move || hasher.verify(&password, &stored_hash)).await?;

        if !matches {
            warn!(user_id = user.id, username = %user.username, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, user.role)?;

        info!(user_id = user.id, username = %user.username, role = %user.role, "User logged in");

        Ok(IssuedToken {
            token,
            expires_in: self.tokens.ttl_secs(),
        })
    }
}

impl<S> AuthService<S> {
    async fn verify_dummy(&self, password: String) -> Result<(), AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let dummy_hash = Arc::clone(&self.dummy_hash);
        run_blocking(move || {
            let hash = match dummy_hash.get() {
                Some(hash) => hash,
                None => {
                    let hash = hasher.hash(DUMMY_PASSWORD)?;
                    dummy_hash.get_or_init(|| hash)
                }
            };
            hasher.verify(&password, hash).map(|_| ())
        })
        .await
    }
}

impl<S> std::fmt::Debug for AuthService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

/// Run a CPU-bound hashing step on the blocking pool.
async fn run_blocking<T, F>(f: F) -> Result<T, AuthError>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::Hashing(PasswordError::Hash(e.to_string())))?
        .map_err(AuthError::from)
}
