//! Middleware for Web API.
//!
//! Protected routes stack [`verify_token`] then [`require_roles`].

pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod role;
pub mod security;

pub use auth::{verify_token, AuthUser};
pub use cors::create_cors_layer;
pub use rate_limit::{api_rate_limit, RateLimitState};
pub use role::require_roles;
pub use security::security_headers;
