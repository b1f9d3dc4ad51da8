//! Unit tests for the enforcement gate.

use chrono::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

use crate::domain::value_objects::{Principal, ProtectedAction, RequestContext, StepUpKey};
use crate::errors::{DomainError, DomainResult, StepUpError};
use crate::repositories::{MockAuditLogRepository, MockSessionBlockRepository};
use crate::services::audit::{AuditService, AuditServiceConfig};
use crate::services::clock::Clock;
use crate::services::stepup::{CodeStore, LockoutService, StepUpConfig, StepUpGate, StepUpService};

use super::mocks::{ManualClock, MemoryCodeStore, MockNotifier};

type TestLockout = LockoutService<MockSessionBlockRepository, MockAuditLogRepository>;
type TestGate =
    StepUpGate<MockNotifier, MemoryCodeStore, MockSessionBlockRepository, MockAuditLogRepository>;

struct Harness {
    clock: Arc<ManualClock>,
    notifier: Arc<MockNotifier>,
    store: Arc<MemoryCodeStore>,
    lockout: Arc<TestLockout>,
    service: Arc<StepUpService<MockNotifier, MemoryCodeStore, MockSessionBlockRepository, MockAuditLogRepository>>,
    gate: TestGate,
}

fn harness(config: StepUpConfig) -> Harness {
    let clock = Arc::new(ManualClock::starting_at_epoch());
    let notifier = Arc::new(MockNotifier::new(false));
    let store = Arc::new(MemoryCodeStore::new(Arc::clone(&clock)));
    let blocks = Arc::new(MockSessionBlockRepository::new());
    let audit = Arc::new(AuditService::new(
        Arc::new(MockAuditLogRepository::new()),
        AuditServiceConfig { async_writes: false },
    ));
    let lockout = Arc::new(LockoutService::with_audit(
        blocks,
        clock.clone() as Arc<dyn Clock>,
        Arc::clone(&audit),
    ));
    let service = Arc::new(StepUpService::with_audit(
        Arc::clone(&notifier),
        Arc::clone(&store),
        Arc::clone(&lockout),
        audit,
        clock.clone() as Arc<dyn Clock>,
        config,
    ));
    let gate = StepUpGate::new(Arc::clone(&service), Arc::clone(&lockout), Arc::clone(&store));

    Harness {
        clock,
        notifier,
        store,
        lockout,
        service,
        gate,
    }
}

fn principal() -> Principal {
    Principal::new(Uuid::new_v4(), "doctor@example.com")
}

fn ctx() -> RequestContext {
    RequestContext::new(None, Some("203.0.113.7".to_string()), None)
}

/// Verify the pair through the real service so a marker exists
async fn pass_verification(h: &Harness, user: &Principal, action: ProtectedAction) {
    h.service.issue_code(user, action, &ctx()).await.unwrap();
    let code = h.notifier.wait_for_code(&user.email).await;
    let outcome = h.service.verify_code(user, action, &code, &ctx()).await.unwrap();
    assert!(outcome.valid);
}

#[tokio::test]
async fn test_unverified_guard_sends_code_and_halts() {
    let h = harness(StepUpConfig::default());
    let user = principal();
    let action = ProtectedAction::ProcessUpdate;
    let calls = AtomicU32::new(0);

    let result: DomainResult<&str> = h
        .gate
        .guard(&user, action, &ctx(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok("done")
        })
        .await;

    match result.unwrap_err() {
        DomainError::StepUp(StepUpError::VerificationRequired { action: a }) => {
            assert_eq!(a, action);
        }
        other => panic!("Expected VerificationRequired, got {:?}", other),
    }
    // The protected call never ran, and a code is now outstanding
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(h.store.has_code(&StepUpKey::new(user.id, action)));
    let _ = h.notifier.wait_for_code(&user.email).await;
}

#[tokio::test]
async fn test_guard_retry_during_cooldown_still_requires_verification() {
    let h = harness(StepUpConfig::default());
    let user = principal();
    let action = ProtectedAction::ProcessUpdate;

    let first: DomainResult<()> = h.gate.guard(&user, action, &ctx(), || async { Ok(()) }).await;
    assert!(matches!(
        first.unwrap_err(),
        DomainError::StepUp(StepUpError::VerificationRequired { .. })
    ));

    // Retrying immediately must not surface the resend throttle
    let second: DomainResult<()> = h.gate.guard(&user, action, &ctx(), || async { Ok(()) }).await;
    assert!(matches!(
        second.unwrap_err(),
        DomainError::StepUp(StepUpError::VerificationRequired { .. })
    ));
}

#[tokio::test]
async fn test_verified_guard_runs_call_and_consumes_marker() {
    let h = harness(StepUpConfig::default());
    let user = principal();
    let action = ProtectedAction::ProcessUpdate;
    let key = StepUpKey::new(user.id, action);

    pass_verification(&h, &user, action).await;

    let result = h
        .gate
        .guard(&user, action, &ctx(), || async { Ok(42) })
        .await
        .unwrap();
    assert_eq!(result, 42);

    // Marker is single-use: the next guard challenges again
    assert!(!h.store.is_verified(&key).await.unwrap());
    let retry: DomainResult<i32> = h.gate.guard(&user, action, &ctx(), || async { Ok(42) }).await;
    assert!(matches!(
        retry.unwrap_err(),
        DomainError::StepUp(StepUpError::VerificationRequired { .. })
    ));
}

#[tokio::test]
async fn test_marker_retained_when_protected_call_fails() {
    let h = harness(StepUpConfig::default());
    let user = principal();
    let action = ProtectedAction::ProcessDelete;
    let key = StepUpKey::new(user.id, action);

    pass_verification(&h, &user, action).await;

    // The protected call fails for unrelated reasons
    let failed: DomainResult<()> = h
        .gate
        .guard(&user, action, &ctx(), || async {
            Err(DomainError::Internal {
                message: "downstream failure".to_string(),
            })
        })
        .await;
    assert!(failed.is_err());

    // No re-verification needed; the retry goes straight through
    assert!(h.store.is_verified(&key).await.unwrap());
    let retried = h
        .gate
        .guard(&user, action, &ctx(), || async { Ok("deleted") })
        .await
        .unwrap();
    assert_eq!(retried, "deleted");

    // And only now is the marker gone
    assert!(!h.store.is_verified(&key).await.unwrap());
}

#[tokio::test]
async fn test_blocked_guard_never_invokes_call_even_with_marker() {
    let h = harness(StepUpConfig::default());
    let user = principal();
    let action = ProtectedAction::ProcessUpdate;
    let calls = AtomicU32::new(0);

    // A stray marker exists from before the block
    pass_verification(&h, &user, action).await;
    h.lockout
        .block(user.id, action, Duration::minutes(30), &ctx())
        .await
        .unwrap();

    let result: DomainResult<()> = h
        .gate
        .guard(&user, action, &ctx(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

    match result.unwrap_err() {
        DomainError::StepUp(StepUpError::Blocked { blocked_until, .. }) => {
            assert_eq!(blocked_until, h.clock.now() + Duration::minutes(30));
        }
        other => panic!("Expected Blocked, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_block_expiry_returns_pair_to_unchallenged() {
    let h = harness(StepUpConfig::default());
    let user = principal();
    let action = ProtectedAction::ProcessUpdate;

    h.lockout
        .block(user.id, action, Duration::minutes(30), &ctx())
        .await
        .unwrap();

    let while_blocked: DomainResult<()> =
        h.gate.guard(&user, action, &ctx(), || async { Ok(()) }).await;
    assert!(matches!(
        while_blocked.unwrap_err(),
        DomainError::StepUp(StepUpError::Blocked { .. })
    ));

    // Once blocked_until passes the pair is simply unchallenged again
    h.clock.advance(Duration::minutes(31));
    let after: DomainResult<()> = h.gate.guard(&user, action, &ctx(), || async { Ok(()) }).await;
    assert!(matches!(
        after.unwrap_err(),
        DomainError::StepUp(StepUpError::VerificationRequired { .. })
    ));
}

#[tokio::test]
async fn test_expired_marker_requires_reverification() {
    let config = StepUpConfig {
        verified_ttl_minutes: 5,
        ..StepUpConfig::default()
    };
    let h = harness(config);
    let user = principal();
    let action = ProtectedAction::ProcessTransfer;

    pass_verification(&h, &user, action).await;
    h.clock.advance(Duration::minutes(6));

    let result: DomainResult<()> = h.gate.guard(&user, action, &ctx(), || async { Ok(()) }).await;
    assert!(matches!(
        result.unwrap_err(),
        DomainError::StepUp(StepUpError::VerificationRequired { .. })
    ));
}
