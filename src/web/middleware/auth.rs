//! Token verification middleware.
//!
//! First stage of the authorization chain: establishes who the caller is.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{identify, AccessError, Claims, TokenService};
use crate::web::error::ApiError;

/// Verify the bearer token and store its claims in the request extensions.
///
/// Rejects with 401 when no usable credential is presented and with 403
/// when the token fails verification. The credential store is not consulted.
pub async fn verify_token(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let claims = identify(header, &tokens).map_err(|e| {
        tracing::debug!(path = %request.uri().path(), "Token verification failed: {}", e);
        e
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Extractor for the verified caller.
///
/// Only available behind [`verify_token`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AccessError::MissingIdentity.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SigningSecret;
    use crate::db::Role;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use http_body_util::BodyExt;
    use tower::util::ServiceExt;

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(
            &SigningSecret::new("middleware-test-secret"),
            3600,
        ))
    }

    async fn whoami(AuthUser(claims): AuthUser) -> String {
        format!("{}:{}", claims.sub, claims.role)
    }

    fn app(tokens: Arc<TokenService>) -> Router {
        Router::new()
            .route("/", get(whoami))
            .layer(middleware::from_fn_with_state(tokens, verify_token))
    }

    fn request(authorization: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let tokens = tokens();
        let token = tokens.issue(9, Role::Manager).unwrap();

        let response = app(tokens)
            .oneshot(request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"9:manager");
    }

    #[tokio::test]
    async fn test_scheme_is_case_insensitive() {
        let tokens = tokens();
        let token = tokens.issue(1, Role::User).unwrap();

        let response = app(tokens)
            .oneshot(request(Some(&format!("bEaReR {}", token))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let response = app(tokens()).oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_scheme_is_unauthorized() {
        let response = app(tokens())
            .oneshot(request(Some("Basic YWxpY2U6c2VjcmV0MQ==")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_empty_token_is_unauthorized() {
        let response = app(tokens())
            .oneshot(request(Some("Bearer ")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_is_forbidden() {
        let response = app(tokens())
            .oneshot(request(Some("Bearer abc.def.ghi")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_expired_token_is_forbidden() {
        let tokens = tokens();
        let token = tokens
            .issue_at(1, Role::Admin, chrono::Utc::now() - chrono::Duration::hours(2))
            .unwrap();

        let response = app(tokens)
            .oneshot(request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_is_unauthorized() {
        let app = Router::new().route("/", get(whoami));

        let response = app.oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
