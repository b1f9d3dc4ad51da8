//! Audit log entity for step-up security events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::RequestContext;

/// Well-known audit action identifiers
pub mod actions {
    /// A one-time code was issued and queued for delivery
    pub const CODE_SENT: &str = "stepup.code_sent";
    /// Code dispatch failed after the record was persisted
    pub const CODE_DISPATCH_FAILED: &str = "stepup.code_dispatch_failed";
    /// A submitted code was verified successfully
    pub const CODE_VERIFIED: &str = "stepup.code_verified";
    /// A verification attempt failed
    pub const VERIFY_FAILED: &str = "stepup.verify_failed";
    /// A lockout was created after the attempt budget was exhausted
    pub const BLOCK_CREATED: &str = "stepup.block_created";
}

/// A single audit log entry.
///
/// Entries are immutable once written; they exist so operators can
/// reconstruct who attempted what, from where, and with what outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLog {
    /// Unique identifier
    pub id: Uuid,

    /// Audit action identifier (see [`actions`])
    pub action: String,

    /// Whether the recorded operation succeeded
    pub success: bool,

    /// User involved, when known
    pub user_id: Option<Uuid>,

    /// Client IP address, when known
    pub ip_address: Option<String>,

    /// Client user agent, when known
    pub user_agent: Option<String>,

    /// Failure detail for unsuccessful operations
    pub error_message: Option<String>,

    /// Entry creation timestamp
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    /// Create a new audit log entry
    pub fn new(action: impl Into<String>, success: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            action: action.into(),
            success,
            user_id: None,
            ip_address: None,
            user_agent: None,
            error_message: None,
            created_at: Utc::now(),
        }
    }

    /// Attach the user the entry concerns
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Attach client context from the request
    pub fn with_request_context(mut self, ctx: &RequestContext) -> Self {
        self.ip_address = ctx.ip_address.clone();
        self.user_agent = ctx.user_agent.clone();
        self
    }

    /// Attach a failure detail
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error_message = Some(error.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let user_id = Uuid::new_v4();
        let ctx = RequestContext::new(None, Some("198.51.100.4".into()), Some("agent".into()));

        let log = AuditLog::new(actions::VERIFY_FAILED, false)
            .with_user(user_id)
            .with_request_context(&ctx)
            .with_error("code mismatch");

        assert_eq!(log.action, actions::VERIFY_FAILED);
        assert!(!log.success);
        assert_eq!(log.user_id, Some(user_id));
        assert_eq!(log.ip_address.as_deref(), Some("198.51.100.4"));
        assert_eq!(log.error_message.as_deref(), Some("code mismatch"));
    }
}
