//! Response DTOs for Web API.

use serde::Serialize;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Registration response.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Confirmation message.
    pub message: String,
    /// Registered username.
    pub username: String,
}

impl RegisterResponse {
    /// Build the confirmation for a username.
    pub fn new(username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            message: format!("User registered successfully with username: {}", username),
            username,
        }
    }
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session token (JWT).
    pub token: String,
    /// Authorization scheme to present the token with.
    pub token_type: &'static str,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

impl LoginResponse {
    /// Wrap a bearer token.
    pub fn bearer(token: String, expires_in: u64) -> Self {
        Self {
            token,
            token_type: "Bearer",
            expires_in,
        }
    }
}

/// Plain message response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Create a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
