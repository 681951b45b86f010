//! Data Transfer Objects for Web API.
//!
//! Request bodies are the auth module's request types; this module holds
//! the JSON extractor and response shapes.

pub mod json;
pub mod response;

pub use json::ApiJson;
pub use response::*;
