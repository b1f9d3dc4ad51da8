//! Request context carried for audit and block records.

use uuid::Uuid;

/// Client context captured at the HTTP boundary.
///
/// Attached to audit log entries and to session blocks so operators can
/// trace where failed verification attempts originated.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Session identifier, when the transport layer tracks one
    pub session_id: Option<Uuid>,
    /// Client IP address
    pub ip_address: Option<String>,
    /// Client user agent string
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Create a context from the parts the transport layer resolved
    pub fn new(
        session_id: Option<Uuid>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            session_id,
            ip_address,
            user_agent,
        }
    }

    /// IP address to persist, falling back to "unknown"
    pub fn ip_or_unknown(&self) -> String {
        self.ip_address
            .clone()
            .unwrap_or_else(|| "unknown".to_string())
    }
}
