//! API handlers for roleguard.

pub mod auth;
pub mod users;

pub use auth::*;
pub use users::*;
