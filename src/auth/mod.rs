//! Authentication and authorization for roleguard.
//!
//! This module provides password hashing, session tokens, the
//! registration/login flow and role-based access checks.

pub mod access;
mod error;
mod password;
mod service;
mod token;
pub mod validation;

pub use access::{authorize, bearer_token, identify, AccessError, RoleSet};
pub use error::AuthError;
pub use password::{PasswordError, PasswordHasher};
pub use service::{AuthService, IssuedToken, RegisteredUser};
pub use token::{Claims, SigningSecret, TokenError, TokenService};
pub use validation::{
    Credentials, LoginRequest, Registration, RegistrationRequest, ValidationError,
};
