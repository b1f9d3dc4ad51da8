//! # MediCase Core
//!
//! Core business logic and domain layer for the MediCase backend.
//! This crate contains the step-up authentication gate protecting sensitive
//! case-record operations: one-time code issuance and verification, the
//! attempt-limited lockout engine, and the enforcement gate, together with
//! the repository interfaces and error types they are built on.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
