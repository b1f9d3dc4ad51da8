//! Enforcement gate wrapping protected operations.
//!
//! Per-pair state machine: Unchallenged -> CodeSent -> Verified, with
//! Blocked derived at query time from the lockout engine. The gate is the
//! only component that consumes verified markers.

use std::future::Future;
use std::sync::Arc;

use crate::domain::value_objects::{Principal, ProtectedAction, RequestContext, StepUpKey};
use crate::errors::{DomainError, DomainResult, StepUpError, ValidationError};
use crate::repositories::{AuditLogRepository, NoOpAuditLogRepository, SessionBlockRepository};

use super::lockout::LockoutService;
use super::service::StepUpService;
use super::traits::{CodeStore, Notifier};

/// Gate enforcing step-up verification around protected calls
pub struct StepUpGate<N, C, B, A = NoOpAuditLogRepository>
where
    N: Notifier,
    C: CodeStore,
    B: SessionBlockRepository,
    A: AuditLogRepository + 'static,
{
    /// Step-up service used to issue codes on first contact
    service: Arc<StepUpService<N, C, B, A>>,
    /// Lockout engine; consulted before anything else
    lockout: Arc<LockoutService<B, A>>,
    /// Verification store holding the markers the gate consumes
    store: Arc<C>,
}

impl<N, C, B, A> StepUpGate<N, C, B, A>
where
    N: Notifier + 'static,
    C: CodeStore,
    B: SessionBlockRepository,
    A: AuditLogRepository + 'static,
{
    /// Create a new gate
    pub fn new(
        service: Arc<StepUpService<N, C, B, A>>,
        lockout: Arc<LockoutService<B, A>>,
        store: Arc<C>,
    ) -> Self {
        Self {
            service,
            lockout,
            store,
        }
    }

    /// Execute `call` only when the pair has passed step-up verification.
    ///
    /// Entry checks run in a fixed order: the lockout check comes first, so
    /// a blocked pair never proceeds even if a stray verified marker still
    /// exists from before the block. An unverified pair triggers a code
    /// send and fails with `VerificationRequired`; a send refused by the
    /// resend cooldown still reports `VerificationRequired`, because the
    /// outstanding code is the one being waited on.
    ///
    /// The verified marker is strictly single-use per successful call: it
    /// is consumed after `call` returns `Ok` and retained when `call`
    /// fails, so an unrelated downstream failure does not force the user
    /// through verification again.
    pub async fn guard<F, Fut, T>(
        &self,
        principal: &Principal,
        action: ProtectedAction,
        ctx: &RequestContext,
        call: F,
    ) -> DomainResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DomainResult<T>>,
    {
        if let Some(block) = self.lockout.is_blocked(principal.id, action).await? {
            tracing::warn!(
                user_id = %principal.id,
                action = %action,
                blocked_until = %block.blocked_until,
                event = "stepup_guard_blocked",
                "Protected call refused: pair is blocked"
            );
            return Err(StepUpError::Blocked {
                action,
                blocked_until: block.blocked_until,
            }
            .into());
        }

        let key = StepUpKey::new(principal.id, action);
        let verified = self
            .store
            .is_verified(&key)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to read verified marker: {}", e),
            })?;

        if !verified {
            match self.service.issue_code(principal, action, ctx).await {
                Ok(_) => {}
                // A throttled resend means a live code is already out
                Err(DomainError::ValidationErr(ValidationError::RateLimitExceeded { .. })) => {}
                Err(e) => return Err(e),
            }

            tracing::info!(
                user_id = %principal.id,
                action = %action,
                event = "stepup_verification_required",
                "Protected call halted pending verification"
            );
            return Err(StepUpError::VerificationRequired { action }.into());
        }

        let result = call().await;

        if result.is_ok() {
            if let Err(e) = self.store.remove_verified(&key).await {
                // The marker's TTL bounds the exposure if removal fails
                tracing::warn!(
                    user_id = %principal.id,
                    action = %action,
                    error = %e,
                    "Failed to consume verified marker after successful call"
                );
            }
        }

        result
    }
}
