//! Role-gated greeting handlers.
//!
//! Access control happens in the route's middleware; these only run for
//! callers whose role is allowed.

use axum::Json;

use crate::web::dto::{ApiResponse, MessageResponse};
use crate::web::middleware::AuthUser;

fn welcome(AuthUser(claims): AuthUser, message: &str) -> Json<ApiResponse<MessageResponse>> {
    tracing::debug!(user_id = claims.sub, role = %claims.role, jti = %claims.jti, "{}", message);
    Json(ApiResponse::new(MessageResponse::new(message)))
}

/// GET /api/users/admin - admin only.
pub async fn welcome_admin(user: AuthUser) -> Json<ApiResponse<MessageResponse>> {
    welcome(user, "Welcome Admin")
}

/// GET /api/users/manager - admin and manager.
pub async fn welcome_manager(user: AuthUser) -> Json<ApiResponse<MessageResponse>> {
    welcome(user, "Welcome Manager")
}

/// GET /api/users/user - every role.
pub async fn welcome_user(user: AuthUser) -> Json<ApiResponse<MessageResponse>> {
    welcome(user, "Welcome User")
}
