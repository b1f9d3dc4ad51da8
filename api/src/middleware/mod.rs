//! HTTP middleware and extractors.

pub mod auth;
pub mod cors;

pub use auth::{request_context, CurrentUser};
pub use cors::create_cors;
