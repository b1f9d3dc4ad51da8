//! Authenticated principal issuing a request.

use uuid::Uuid;

/// The authenticated user on whose behalf a protected call runs.
///
/// Resolved at the HTTP boundary (JWT claims); the core only needs the
/// identity and the registered email address codes are delivered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// User identifier
    pub id: Uuid,
    /// Registered email address for out-of-band code delivery
    pub email: String,
}

impl Principal {
    /// Create a new principal
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}
