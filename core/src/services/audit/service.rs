//! Audit service for recording verification attempts and security events.
//!
//! Writes can run asynchronously so audit persistence never blocks the
//! verification flow; an audit failure is logged and swallowed, it must not
//! fail the business operation it describes.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::domain::entities::audit::{actions, AuditLog};
use crate::domain::value_objects::{ProtectedAction, RequestContext};
use crate::errors::DomainResult;
use crate::repositories::AuditLogRepository;

/// Configuration for the audit service
#[derive(Debug, Clone)]
pub struct AuditServiceConfig {
    /// Whether to run audit writes on a spawned task
    pub async_writes: bool,
}

impl Default for AuditServiceConfig {
    fn default() -> Self {
        Self { async_writes: true }
    }
}

/// Service for recording step-up audit events
pub struct AuditService<R>
where
    R: AuditLogRepository,
{
    repository: Arc<R>,
    config: AuditServiceConfig,
}

impl<R> AuditService<R>
where
    R: AuditLogRepository + 'static,
{
    /// Create a new audit service
    pub fn new(repository: Arc<R>, config: AuditServiceConfig) -> Self {
        Self { repository, config }
    }

    /// Create a new audit service with default configuration
    pub fn with_defaults(repository: Arc<R>) -> Self {
        Self::new(repository, AuditServiceConfig::default())
    }

    /// Record a code issuance for a pair
    pub async fn log_code_sent(
        &self,
        user_id: Uuid,
        action: ProtectedAction,
        ctx: &RequestContext,
    ) -> DomainResult<()> {
        let log = AuditLog::new(actions::CODE_SENT, true)
            .with_user(user_id)
            .with_request_context(ctx)
            .with_error(action.as_str().to_string());
        self.write(log).await
    }

    /// Record a dispatch failure after the code record was persisted
    pub async fn log_code_dispatch_failed(
        &self,
        user_id: Uuid,
        action: ProtectedAction,
        ctx: &RequestContext,
        error: impl Into<String>,
    ) -> DomainResult<()> {
        let log = AuditLog::new(actions::CODE_DISPATCH_FAILED, false)
            .with_user(user_id)
            .with_request_context(ctx)
            .with_error(format!("{}: {}", action, error.into()));
        self.write(log).await
    }

    /// Record a successful verification
    pub async fn log_code_verified(
        &self,
        user_id: Uuid,
        action: ProtectedAction,
        ctx: &RequestContext,
    ) -> DomainResult<()> {
        let log = AuditLog::new(actions::CODE_VERIFIED, true)
            .with_user(user_id)
            .with_request_context(ctx)
            .with_error(action.as_str().to_string());
        self.write(log).await
    }

    /// Record a failed verification attempt with its internal reason
    pub async fn log_verify_failed(
        &self,
        user_id: Uuid,
        action: ProtectedAction,
        ctx: &RequestContext,
        reason: impl Into<String>,
    ) -> DomainResult<()> {
        let log = AuditLog::new(actions::VERIFY_FAILED, false)
            .with_user(user_id)
            .with_request_context(ctx)
            .with_error(format!("{}: {}", action, reason.into()));
        self.write(log).await
    }

    /// Record the creation of a lockout
    pub async fn log_block_created(
        &self,
        user_id: Uuid,
        action: ProtectedAction,
        ctx: &RequestContext,
        blocked_until: DateTime<Utc>,
    ) -> DomainResult<()> {
        let log = AuditLog::new(actions::BLOCK_CREATED, true)
            .with_user(user_id)
            .with_request_context(ctx)
            .with_error(format!("{}: blocked until {}", action, blocked_until));
        self.write(log).await
    }

    /// Write an entry, honouring the async-writes setting
    async fn write(&self, log: AuditLog) -> DomainResult<()> {
        if self.config.async_writes {
            let repository = Arc::clone(&self.repository);
            task::spawn(async move {
                if let Err(e) = repository.create(&log).await {
                    tracing::warn!(error = %e, action = %log.action, "Audit write failed");
                }
            });
            Ok(())
        } else {
            if let Err(e) = self.repository.create(&log).await {
                tracing::warn!(error = %e, action = %log.action, "Audit write failed");
            }
            Ok(())
        }
    }
}
