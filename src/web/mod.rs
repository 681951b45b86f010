//! HTTP surface for roleguard.
//!
//! Registration and login under `/api/auth`, role-gated routes under
//! `/api/users`, and a `/health` probe.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::{create_app, create_router};
pub use server::WebServer;
