//! HTTP API layer for the MediCase step-up verification service.
//!
//! Exposes the code send/verify endpoints, the protected case-record
//! endpoints demonstrating the gate, and the JWT-based principal
//! extraction the gate relies on.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::{create_app, AppState};
