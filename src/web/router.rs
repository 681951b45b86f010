//! Router configuration for Web API.

use axum::{
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use super::error::ApiError;
use super::handlers::{login, register, welcome_admin, welcome_manager, welcome_user, AppState};
use super::middleware::{
    api_rate_limit, create_cors_layer, require_roles, security_headers, verify_token,
    RateLimitState,
};
use crate::auth::{RoleSet, TokenService};
use crate::config::WebConfig;
use crate::db::Role;

/// Guard a route with token verification followed by the role check.
pub fn protected<S>(
    route: MethodRouter<S>,
    tokens: &Arc<TokenService>,
    allowed: RoleSet,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn_with_state(Arc::clone(tokens), verify_token))
            .layer(middleware::from_fn_with_state(allowed, require_roles)),
    )
}

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    rate_limit: Arc<RateLimitState>,
    config: &WebConfig,
) -> Router {
    let tokens = Arc::clone(app_state.tokens());

    // Auth routes (no authentication required)
    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login));

    // Role-gated routes
    let user_routes = Router::new()
        .route(
            "/admin",
            protected(get(welcome_admin), &tokens, RoleSet::only(Role::Admin)),
        )
        .route(
            "/manager",
            protected(
                get(welcome_manager),
                &tokens,
                RoleSet::new(Role::Admin, [Role::Manager]),
            ),
        )
        .route("/user", protected(get(welcome_user), &tokens, RoleSet::all()));

    // API routes, rate limited per client IP
    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .fallback(api_not_found)
        .layer(middleware::from_fn_with_state(rate_limit, api_rate_limit));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&config.cors_origins))
                .layer(middleware::from_fn(security_headers)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create the complete application: API, health check and compression.
pub fn create_app(
    app_state: Arc<AppState>,
    rate_limit: Arc<RateLimitState>,
    config: &WebConfig,
) -> Router {
    create_router(app_state, rate_limit, config)
        .merge(create_health_router())
        .layer(CompressionLayer::new())
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Fallback for unknown API paths.
async fn api_not_found() -> ApiError {
    ApiError::not_found("Resource not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SigningSecret;
    use crate::config::AuthConfig;
    use crate::db::Database;
    use axum::http::StatusCode;
    use axum_test::TestServer;

    async fn app() -> Router {
        let db = Database::open_in_memory().await.unwrap();
        let config = AuthConfig {
            jwt_secret: SigningSecret::new("router-test-secret"),
            hash_memory_kib: 1024,
            hash_iterations: 1,
            hash_parallelism: 1,
            ..AuthConfig::default()
        };
        let state = Arc::new(AppState::from_config(&db, &config).unwrap());
        let web = WebConfig::default();

        create_app(state, Arc::new(RateLimitState::from_config(&web)), &web)
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = TestServer::new(create_health_router()).unwrap();

        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_unknown_api_path_is_json_404() {
        let server = TestServer::new(app().await).unwrap();

        let response = server.get("/api/nothing-here").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_security_headers_on_api_responses() {
        let server = TestServer::new(app().await).unwrap();

        let response = server.get("/api/users/user").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.header("x-frame-options"), "DENY");
        assert_eq!(response.header("x-content-type-options"), "nosniff");
    }
}
