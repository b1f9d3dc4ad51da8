//! Step-up verification service: code issuance and attempt tracking.

use std::sync::Arc;

use crate::domain::entities::StepUpCode;
use crate::domain::value_objects::{Principal, ProtectedAction, RequestContext, StepUpKey};
use crate::errors::{DomainError, DomainResult, StepUpError, ValidationError};
use crate::repositories::{AuditLogRepository, NoOpAuditLogRepository, SessionBlockRepository};
use crate::services::audit::AuditService;
use crate::services::clock::Clock;

use super::config::StepUpConfig;
use super::lockout::LockoutService;
use super::traits::{CodeStore, Notifier};
use super::types::{IssueOutcome, VerifyOutcome};

/// Service handling one-time code issuance and verification for
/// `(user, action)` pairs.
pub struct StepUpService<N, C, B, A = NoOpAuditLogRepository>
where
    N: Notifier,
    C: CodeStore,
    B: SessionBlockRepository,
    A: AuditLogRepository + 'static,
{
    /// Notifier delivering codes out-of-band
    notifier: Arc<N>,
    /// Verification store holding codes, counters and markers
    store: Arc<C>,
    /// Lockout engine consulted before any operation and invoked on
    /// attempt exhaustion
    lockout: Arc<LockoutService<B, A>>,
    /// Optional audit sink
    audit: Option<Arc<AuditService<A>>>,
    /// Clock for expiry and cooldown arithmetic
    clock: Arc<dyn Clock>,
    /// Service configuration
    config: StepUpConfig,
}

impl<N, C, B, A> StepUpService<N, C, B, A>
where
    N: Notifier + 'static,
    C: CodeStore,
    B: SessionBlockRepository,
    A: AuditLogRepository + 'static,
{
    /// Create a new step-up service
    pub fn new(
        notifier: Arc<N>,
        store: Arc<C>,
        lockout: Arc<LockoutService<B, A>>,
        clock: Arc<dyn Clock>,
        config: StepUpConfig,
    ) -> Self {
        Self {
            notifier,
            store,
            lockout,
            audit: None,
            clock,
            config,
        }
    }

    /// Create a new step-up service with audit logging
    pub fn with_audit(
        notifier: Arc<N>,
        store: Arc<C>,
        lockout: Arc<LockoutService<B, A>>,
        audit: Arc<AuditService<A>>,
        clock: Arc<dyn Clock>,
        config: StepUpConfig,
    ) -> Self {
        Self {
            notifier,
            store,
            lockout,
            audit: Some(audit),
            clock,
            config,
        }
    }

    /// Issue a one-time code for a `(user, action)` pair.
    ///
    /// Overwrites any previous unconsumed code for the pair, so only the
    /// most recently issued code ever verifies. Dispatch happens on a
    /// spawned task: once the record is persisted the code counts as sent,
    /// and a delivery failure is logged and audited rather than surfaced.
    ///
    /// # Errors
    ///
    /// * `StepUpError::Blocked` when an active lockout exists
    /// * `ValidationError::RateLimitExceeded` inside the resend cooldown
    /// * `DomainError::Internal` when the record cannot be persisted
    pub async fn issue_code(
        &self,
        principal: &Principal,
        action: ProtectedAction,
        ctx: &RequestContext,
    ) -> DomainResult<IssueOutcome> {
        if let Some(block) = self.lockout.is_blocked(principal.id, action).await? {
            return Err(StepUpError::Blocked {
                action,
                blocked_until: block.blocked_until,
            }
            .into());
        }

        let now = self.clock.now();
        let key = StepUpKey::new(principal.id, action);

        // Refuse to reissue inside the cooldown window; the outstanding
        // code is still the valid one.
        if let Some(existing) = self.fetch_code(&key).await? {
            if !existing.is_expired(now) {
                let elapsed = now - existing.created_at;
                let cooldown = self.config.resend_cooldown();
                if elapsed < cooldown {
                    let retry_after = (cooldown - elapsed).num_seconds().max(1);
                    tracing::warn!(
                        user_id = %principal.id,
                        action = %action,
                        retry_after_seconds = retry_after,
                        event = "stepup_resend_throttled",
                        "Code resend requested inside cooldown window"
                    );
                    return Err(ValidationError::RateLimitExceeded {
                        retry_after_seconds: retry_after,
                    }
                    .into());
                }
            }
        }

        let (record, code) = StepUpCode::issue(
            principal.id,
            action,
            self.config.code_ttl_minutes,
            now,
        );

        self.store
            .put_code(&key, &record, self.config.code_ttl_seconds(), self.config.max_attempts)
            .await
            .map_err(|e| {
                tracing::error!(
                    user_id = %principal.id,
                    action = %action,
                    error = %e,
                    event = "stepup_code_storage_failed",
                    "Failed to persist one-time code"
                );
                DomainError::Internal {
                    message: format!("Failed to store verification code: {}", e),
                }
            })?;

        tracing::info!(
            user_id = %principal.id,
            action = %action,
            code_id = %record.id,
            expires_at = %record.expires_at,
            event = "stepup_code_issued",
            "Issued one-time code for protected action"
        );

        if let Some(audit) = &self.audit {
            let _ = audit.log_code_sent(principal.id, action, ctx).await;
        }

        self.dispatch(principal, action, code, ctx.clone());

        Ok(IssueOutcome {
            expires_at: record.expires_at,
            next_resend_at: now + self.config.resend_cooldown(),
        })
    }

    /// Verify a submitted code for a `(user, action)` pair.
    ///
    /// Wrong-shaped input is not special-cased: it compares like any other
    /// mismatch and consumes an attempt. An absent or expired code reports
    /// zero remaining attempts with `needs_resend` set, without touching
    /// the counter (there is nothing left to decrement).
    ///
    /// # Errors
    ///
    /// * `StepUpError::Blocked` when an active lockout exists; a lockout
    ///   always takes precedence over a would-be-valid code
    /// * `DomainError::Internal` on store failures
    pub async fn verify_code(
        &self,
        principal: &Principal,
        action: ProtectedAction,
        submitted: &str,
        ctx: &RequestContext,
    ) -> DomainResult<VerifyOutcome> {
        if let Some(block) = self.lockout.is_blocked(principal.id, action).await? {
            return Err(StepUpError::Blocked {
                action,
                blocked_until: block.blocked_until,
            }
            .into());
        }

        let now = self.clock.now();
        let key = StepUpKey::new(principal.id, action);

        let record = match self.fetch_code(&key).await? {
            Some(record) if record.is_expired(now) => {
                // Distinguished internally for diagnostics; callers see the
                // same "request a new code" outcome as a missing record.
                let _ = self.store.remove_code(&key).await;
                tracing::warn!(
                    user_id = %principal.id,
                    action = %action,
                    event = "stepup_code_expired",
                    "Verification attempted against expired code"
                );
                if let Some(audit) = &self.audit {
                    let _ = audit
                        .log_verify_failed(principal.id, action, ctx, "code expired")
                        .await;
                }
                return Ok(VerifyOutcome::missing_code());
            }
            Some(record) => record,
            None => {
                tracing::warn!(
                    user_id = %principal.id,
                    action = %action,
                    event = "stepup_code_not_found",
                    "Verification attempted with no code on record"
                );
                if let Some(audit) = &self.audit {
                    let _ = audit
                        .log_verify_failed(principal.id, action, ctx, "code not found")
                        .await;
                }
                return Ok(VerifyOutcome::missing_code());
            }
        };

        if record.matches(submitted) {
            self.store.remove_code(&key).await.map_err(|e| DomainError::Internal {
                message: format!("Failed to consume verified code: {}", e),
            })?;
            self.store
                .put_verified(&key, self.config.verified_ttl_seconds())
                .await
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to create verified marker: {}", e),
                })?;

            tracing::info!(
                user_id = %principal.id,
                action = %action,
                event = "stepup_code_verified",
                "One-time code verified"
            );
            if let Some(audit) = &self.audit {
                let _ = audit.log_code_verified(principal.id, action, ctx).await;
            }

            return Ok(VerifyOutcome::verified());
        }

        // Atomic decrement: concurrent failures each observe a distinct
        // remaining count, so exhaustion cannot be skipped over.
        let remaining = self
            .store
            .consume_attempt(&key)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to track verification attempt: {}", e),
            })?;

        if remaining == 0 {
            let _ = self.store.remove_code(&key).await;

            tracing::error!(
                user_id = %principal.id,
                action = %action,
                event = "stepup_attempts_exhausted",
                "Verification attempt budget exhausted"
            );
            if let Some(audit) = &self.audit {
                let _ = audit
                    .log_verify_failed(principal.id, action, ctx, "attempts exhausted")
                    .await;
            }

            self.lockout
                .block(principal.id, action, self.config.block_duration(), ctx)
                .await?;

            return Ok(VerifyOutcome::exhausted());
        }

        tracing::warn!(
            user_id = %principal.id,
            action = %action,
            remaining_attempts = remaining,
            event = "stepup_verify_failed",
            "Submitted code did not match"
        );
        if let Some(audit) = &self.audit {
            let _ = audit
                .log_verify_failed(principal.id, action, ctx, "code mismatch")
                .await;
        }

        Ok(VerifyOutcome::rejected(remaining))
    }

    /// Fetch the stored code, mapping store failures to internal errors
    async fn fetch_code(&self, key: &StepUpKey) -> DomainResult<Option<StepUpCode>> {
        self.store
            .get_code(key)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to read verification code: {}", e),
            })
    }

    /// Dispatch the code on a spawned task.
    ///
    /// The stored record is the source of truth for verification, so the
    /// request path never waits on mail delivery and a dispatch failure is
    /// only logged and audited.
    fn dispatch(
        &self,
        principal: &Principal,
        action: ProtectedAction,
        code: String,
        ctx: RequestContext,
    ) {
        let notifier = Arc::clone(&self.notifier);
        let audit = self.audit.clone();
        let email = principal.email.clone();
        let user_id = principal.id;
        let validity_minutes = self.config.code_ttl_minutes;

        tokio::spawn(async move {
            match notifier
                .send_code(&email, &code, action.label(), validity_minutes)
                .await
            {
                Ok(message_id) => {
                    tracing::debug!(
                        user_id = %user_id,
                        action = %action,
                        message_id = %message_id,
                        event = "stepup_code_dispatched",
                        "One-time code dispatched"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        user_id = %user_id,
                        action = %action,
                        error = %e,
                        event = "stepup_code_dispatch_failed",
                        "One-time code dispatch failed; stored code remains valid"
                    );
                    if let Some(audit) = audit {
                        let _ = audit
                            .log_code_dispatch_failed(user_id, action, &ctx, e)
                            .await;
                    }
                }
            }
        });
    }
}
