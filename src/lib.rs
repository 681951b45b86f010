//! roleguard - credential issuing and role-based access control.
//!
//! Users register with a username, password and role, log in for a
//! signed one-hour session token, and present that token to reach routes
//! gated by role.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{
    AccessError, AuthError, AuthService, Claims, PasswordError, PasswordHasher, RoleSet,
    SigningSecret, TokenError, TokenService,
};
pub use config::Config;
pub use db::{CredentialStore, Database, NewUser, Role, StoreError, User, UserRepository};
pub use error::{Result, RoleguardError};
pub use web::WebServer;
