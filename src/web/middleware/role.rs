//! Role check middleware.
//!
//! Second stage of the authorization chain. Must run after
//! [`verify_token`](super::auth::verify_token).

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{authorize, Claims, RoleSet};
use crate::web::error::ApiError;

/// Allow the request through only if the verified role is in the set.
pub async fn require_roles(
    State(allowed): State<RoleSet>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = request.extensions().get::<Claims>();

    if let Err(e) = authorize(identity, &allowed) {
        tracing::warn!(
            path = %request.uri().path(),
            user_id = identity.map(|c| c.sub),
            allowed = %allowed,
            "Access denied: {}",
            e
        );
        return Err(e.into());
    }

    Ok(next.run(request).await)
}
