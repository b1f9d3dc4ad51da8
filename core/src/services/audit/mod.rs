//! Audit service for recording step-up security events.

mod service;

#[cfg(test)]
mod tests;

pub use service::{AuditService, AuditServiceConfig};
