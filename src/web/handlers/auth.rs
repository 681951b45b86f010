//! Authentication handlers.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::auth::{AuthService, LoginRequest, PasswordHasher, RegistrationRequest, TokenService};
use crate::config::AuthConfig;
use crate::db::{Database, UserRepository};
use crate::web::dto::{ApiJson, ApiResponse, LoginResponse, RegisterResponse};
use crate::web::error::ApiError;
use crate::RoleguardError;

/// Application state shared across handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Registration and login over the SQLite user store.
    pub auth: AuthService<UserRepository>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(auth: AuthService<UserRepository>) -> Self {
        Self { auth }
    }

    /// Build the application state from a database and the auth configuration.
    pub fn from_config(db: &Database, config: &AuthConfig) -> crate::Result<Self> {
        let hasher =
            PasswordHasher::new(config).map_err(|e| RoleguardError::Config(e.to_string()))?;
        let tokens = Arc::new(TokenService::from_config(config));
        let repo = UserRepository::new(db.pool().clone());

        Ok(Self::new(AuthService::new(repo, hasher, tokens)))
    }

    /// The token service shared with the authorization middleware.
    pub fn tokens(&self) -> &Arc<TokenService> {
        self.auth.tokens()
    }
}

/// POST /api/auth/register - User registration.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegistrationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), ApiError> {
    let registered = state.auth.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(RegisterResponse::new(registered.username))),
    ))
}

/// POST /api/auth/login - User login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let issued = state.auth.login(req).await?;

    Ok(Json(ApiResponse::new(LoginResponse::bearer(
        issued.token,
        issued.expires_in,
    ))))
}
