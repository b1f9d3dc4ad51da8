//! No-op implementation of AuditLogRepository.
//!
//! Used when audit logging is disabled; every operation succeeds without
//! writing anything.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::AuditLog;
use crate::errors::DomainError;

use super::AuditLogRepository;

/// AuditLogRepository that drops every entry
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpAuditLogRepository;

#[async_trait]
impl AuditLogRepository for NoOpAuditLogRepository {
    async fn create(&self, _audit_log: &AuditLog) -> Result<(), DomainError> {
        Ok(())
    }

    async fn find_by_user(
        &self,
        _user_id: Uuid,
        _limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError> {
        Ok(Vec::new())
    }
}
