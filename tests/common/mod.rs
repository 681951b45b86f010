//! Test helpers for HTTP integration tests.
//!
//! Builds the full application over an in-memory database with a cheap
//! password hashing work factor.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum_test::{TestResponse, TestServer};
use roleguard::config::{AuthConfig, WebConfig};
use roleguard::web::handlers::AppState;
use roleguard::web::middleware::RateLimitState;
use roleguard::web::router::create_app;
use roleguard::{Database, SigningSecret, TokenService};
use serde_json::{json, Value};

/// Signing secret used by every test server.
pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";

/// Auth configuration with a low Argon2 work factor.
pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: SigningSecret::new(TEST_SECRET),
        token_ttl_secs: 3600,
        hash_memory_kib: 1024,
        hash_iterations: 1,
        hash_parallelism: 1,
    }
}

/// Web configuration with a generous rate limit.
pub fn test_web_config() -> WebConfig {
    WebConfig {
        cors_origins: vec![],
        rate_limit_max: 1000,
        rate_limit_window_secs: 900,
        trust_proxy: false,
    }
}

/// A running test application.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub tokens: Arc<TokenService>,
}

/// Create a test server with an in-memory database.
pub async fn create_test_server() -> TestApp {
    create_test_server_with(test_web_config()).await
}

/// Create a test server with custom web configuration.
pub async fn create_test_server_with(web: WebConfig) -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let app_state =
        Arc::new(AppState::from_config(&db, &test_auth_config()).expect("valid auth config"));
    let tokens = Arc::clone(app_state.tokens());
    let rate_limit = Arc::new(RateLimitState::from_config(&web));

    let router = create_app(app_state, rate_limit, &web);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp { server, db, tokens }
}

/// Register a user and return the raw response.
pub async fn register(
    server: &TestServer,
    username: &str,
    password: &str,
    role: &str,
) -> TestResponse {
    server
        .post("/api/auth/register")
        .json(&json!({
            "username": username,
            "password": password,
            "role": role
        }))
        .await
}

/// Log in and return the raw response.
pub async fn login(server: &TestServer, username: &str, password: &str) -> TestResponse {
    server
        .post("/api/auth/login")
        .json(&json!({
            "username": username,
            "password": password
        }))
        .await
}

/// Register a user, log in and return the session token.
pub async fn register_and_login(
    server: &TestServer,
    username: &str,
    password: &str,
    role: &str,
) -> String {
    register(server, username, password, role).await;
    let body: Value = login(server, username, password).await.json();
    body["data"]["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}

/// GET a path with a bearer token.
pub async fn get_with_token(server: &TestServer, path: &str, token: &str) -> TestResponse {
    server
        .get(path)
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await
}
