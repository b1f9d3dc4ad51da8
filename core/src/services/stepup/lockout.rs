//! Lockout engine owning the durable block records.

use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::SessionBlock;
use crate::domain::value_objects::{ProtectedAction, RequestContext};
use crate::errors::DomainResult;
use crate::repositories::{AuditLogRepository, NoOpAuditLogRepository, SessionBlockRepository};
use crate::services::audit::AuditService;
use crate::services::clock::Clock;

/// Service owning block records for `(user, action)` pairs.
///
/// Blocks are insert-only; concurrent failures may create duplicate rows,
/// which is harmless because [`is_blocked`](LockoutService::is_blocked)
/// always resolves to the row with the furthest `blocked_until`.
pub struct LockoutService<B, A = NoOpAuditLogRepository>
where
    B: SessionBlockRepository,
    A: AuditLogRepository + 'static,
{
    /// Repository for block rows
    blocks: Arc<B>,
    /// Clock for "active at" evaluation
    clock: Arc<dyn Clock>,
    /// Optional audit sink for block creation
    audit: Option<Arc<AuditService<A>>>,
}

impl<B, A> LockoutService<B, A>
where
    B: SessionBlockRepository,
    A: AuditLogRepository + 'static,
{
    /// Create a new lockout service
    pub fn new(blocks: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            blocks,
            clock,
            audit: None,
        }
    }

    /// Create a new lockout service with audit logging
    pub fn with_audit(blocks: Arc<B>, clock: Arc<dyn Clock>, audit: Arc<AuditService<A>>) -> Self {
        Self {
            blocks,
            clock,
            audit: Some(audit),
        }
    }

    /// Return the governing active block for a pair, if any
    pub async fn is_blocked(
        &self,
        user_id: Uuid,
        action: ProtectedAction,
    ) -> DomainResult<Option<SessionBlock>> {
        self.blocks
            .find_active(user_id, action, self.clock.now())
            .await
    }

    /// Create a new block for a pair lasting `duration` from now.
    ///
    /// Existing blocks are never extended; the new row simply becomes the
    /// governing one when its deadline is the furthest out.
    pub async fn block(
        &self,
        user_id: Uuid,
        action: ProtectedAction,
        duration: Duration,
        ctx: &RequestContext,
    ) -> DomainResult<SessionBlock> {
        let block = SessionBlock::new(user_id, action, duration, ctx, self.clock.now());
        self.blocks.insert(&block).await?;

        tracing::warn!(
            user_id = %user_id,
            action = %action,
            blocked_until = %block.blocked_until,
            ip = %block.ip_address,
            event = "stepup_block_created",
            "Pair blocked after repeated verification failures"
        );

        if let Some(audit) = &self.audit {
            let _ = audit
                .log_block_created(user_id, action, ctx, block.blocked_until)
                .await;
        }

        Ok(block)
    }
}
