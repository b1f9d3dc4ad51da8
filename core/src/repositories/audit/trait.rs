//! Audit log repository trait defining the interface for audit persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::AuditLog;
use crate::errors::DomainError;

/// Repository trait for AuditLog persistence.
///
/// Implementations should handle writes efficiently: the audit service may
/// issue them from spawned tasks so they never block verification flows.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Create a new audit log entry
    async fn create(&self, audit_log: &AuditLog) -> Result<(), DomainError>;

    /// Find audit logs by user ID, ordered by created_at descending
    ///
    /// # Arguments
    /// * `user_id` - The user to search for
    /// * `limit` - Maximum number of records to return
    async fn find_by_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError>;
}
