//! Unit tests for the step-up verification service.

use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::audit::actions;
use crate::domain::value_objects::{Principal, ProtectedAction, RequestContext, StepUpKey};
use crate::errors::{DomainError, StepUpError, ValidationError};
use crate::repositories::{MockAuditLogRepository, MockSessionBlockRepository};
use crate::services::audit::{AuditService, AuditServiceConfig};
use crate::services::clock::Clock;
use crate::services::stepup::{CodeStore, LockoutService, StepUpConfig, StepUpService};

use super::mocks::{ManualClock, MemoryCodeStore, MockNotifier};

type TestService =
    StepUpService<MockNotifier, MemoryCodeStore, MockSessionBlockRepository, MockAuditLogRepository>;

struct Harness {
    clock: Arc<ManualClock>,
    notifier: Arc<MockNotifier>,
    store: Arc<MemoryCodeStore>,
    blocks: Arc<MockSessionBlockRepository>,
    audit_repo: Arc<MockAuditLogRepository>,
    service: TestService,
    config: StepUpConfig,
}

fn harness(config: StepUpConfig) -> Harness {
    harness_with_notifier(config, MockNotifier::new(false))
}

fn harness_with_notifier(config: StepUpConfig, notifier: MockNotifier) -> Harness {
    let clock = Arc::new(ManualClock::starting_at_epoch());
    let notifier = Arc::new(notifier);
    let store = Arc::new(MemoryCodeStore::new(Arc::clone(&clock)));
    let blocks = Arc::new(MockSessionBlockRepository::new());
    let audit_repo = Arc::new(MockAuditLogRepository::new());
    // Synchronous audit writes keep assertions deterministic
    let audit = Arc::new(AuditService::new(
        Arc::clone(&audit_repo),
        AuditServiceConfig { async_writes: false },
    ));
    let lockout = Arc::new(LockoutService::with_audit(
        Arc::clone(&blocks),
        clock.clone() as Arc<dyn crate::services::clock::Clock>,
        Arc::clone(&audit),
    ));
    let service = StepUpService::with_audit(
        Arc::clone(&notifier),
        Arc::clone(&store),
        lockout,
        audit,
        clock.clone() as Arc<dyn crate::services::clock::Clock>,
        config.clone(),
    );

    Harness {
        clock,
        notifier,
        store,
        blocks,
        audit_repo,
        service,
        config,
    }
}

fn principal() -> Principal {
    Principal::new(Uuid::new_v4(), "doctor@example.com")
}

fn ctx() -> RequestContext {
    RequestContext::new(None, Some("203.0.113.7".to_string()), Some("test-agent".into()))
}

#[tokio::test]
async fn test_issue_code_stores_and_dispatches() {
    let h = harness(StepUpConfig::default());
    let user = principal();
    let action = ProtectedAction::ProcessUpdate;

    let outcome = h.service.issue_code(&user, action, &ctx()).await.unwrap();

    assert!(h.store.has_code(&StepUpKey::new(user.id, action)));
    assert_eq!(outcome.expires_at, h.clock.now() + Duration::minutes(10));
    assert_eq!(outcome.next_resend_at, h.clock.now() + Duration::seconds(60));

    let code = h.notifier.wait_for_code(&user.email).await;
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let sent = h.notifier.sent.lock().unwrap();
    assert_eq!(sent[0].action_label, "update a case record");
    assert_eq!(sent[0].validity_minutes, 10);
}

#[tokio::test]
async fn test_second_issue_invalidates_first_code() {
    let h = harness(StepUpConfig::default());
    let user = principal();
    let action = ProtectedAction::ProcessUpdate;

    h.service.issue_code(&user, action, &ctx()).await.unwrap();
    let first_code = h.notifier.wait_for_code(&user.email).await;

    h.clock.advance(Duration::seconds(61));
    h.service.issue_code(&user, action, &ctx()).await.unwrap();

    // Wait for the second dispatch before reading the latest code
    for _ in 0..100 {
        if h.notifier.sent_count() >= 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    let second_code = h.notifier.wait_for_code(&user.email).await;

    // The first code no longer verifies even when it differs from the new one
    if first_code != second_code {
        let outcome = h
            .service
            .verify_code(&user, action, &first_code, &ctx())
            .await
            .unwrap();
        assert!(!outcome.valid);
    }

    let outcome = h
        .service
        .verify_code(&user, action, &second_code, &ctx())
        .await
        .unwrap();
    assert!(outcome.valid);
}

#[tokio::test]
async fn test_resend_inside_cooldown_is_throttled() {
    let h = harness(StepUpConfig::default());
    let user = principal();
    let action = ProtectedAction::ProcessDelete;

    h.service.issue_code(&user, action, &ctx()).await.unwrap();
    let result = h.service.issue_code(&user, action, &ctx()).await;

    match result.unwrap_err() {
        DomainError::ValidationErr(ValidationError::RateLimitExceeded { retry_after_seconds }) => {
            assert!(retry_after_seconds > 0 && retry_after_seconds <= 60);
        }
        other => panic!("Expected rate limit error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_verify_success_creates_single_use_marker() {
    let h = harness(StepUpConfig::default());
    let user = principal();
    let action = ProtectedAction::ProcessUpdate;
    let key = StepUpKey::new(user.id, action);

    h.service.issue_code(&user, action, &ctx()).await.unwrap();
    let code = h.notifier.wait_for_code(&user.email).await;

    let outcome = h.service.verify_code(&user, action, &code, &ctx()).await.unwrap();
    assert!(outcome.valid);
    assert!(!h.store.has_code(&key));
    assert!(h.store.is_verified(&key).await.unwrap());

    // The code is gone: re-submitting it reports a missing code
    let replay = h.service.verify_code(&user, action, &code, &ctx()).await.unwrap();
    assert!(!replay.valid);
    assert_eq!(replay.remaining_attempts, 0);
    assert!(replay.needs_resend);
}

#[tokio::test]
async fn test_wrong_code_decrements_attempts() {
    let h = harness(StepUpConfig::default());
    let user = principal();
    let action = ProtectedAction::ProcessUpdate;

    h.service.issue_code(&user, action, &ctx()).await.unwrap();
    let code = h.notifier.wait_for_code(&user.email).await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let outcome = h.service.verify_code(&user, action, wrong, &ctx()).await.unwrap();
    assert!(!outcome.valid);
    assert_eq!(outcome.remaining_attempts, h.config.max_attempts - 1);
    assert!(!outcome.needs_resend);
}

#[tokio::test]
async fn test_malformed_code_still_consumes_attempt() {
    let h = harness(StepUpConfig::default());
    let user = principal();
    let action = ProtectedAction::ProcessUpdate;

    h.service.issue_code(&user, action, &ctx()).await.unwrap();

    let outcome = h
        .service
        .verify_code(&user, action, "not-a-code", &ctx())
        .await
        .unwrap();
    assert!(!outcome.valid);
    assert_eq!(outcome.remaining_attempts, h.config.max_attempts - 1);
}

#[tokio::test]
async fn test_verify_without_code_reports_resend() {
    let h = harness(StepUpConfig::default());
    let user = principal();

    let outcome = h
        .service
        .verify_code(&user, ProtectedAction::ProcessDelete, "123456", &ctx())
        .await
        .unwrap();

    assert!(!outcome.valid);
    assert_eq!(outcome.remaining_attempts, 0);
    assert!(outcome.needs_resend);
    // Nothing was decremented; no block was created either
    assert!(h.blocks.get_all_blocks().is_empty());
}

#[tokio::test]
async fn test_expired_code_reports_resend() {
    let h = harness(StepUpConfig::default());
    let user = principal();
    let action = ProtectedAction::ProcessUpdate;

    h.service.issue_code(&user, action, &ctx()).await.unwrap();
    let code = h.notifier.wait_for_code(&user.email).await;

    h.clock.advance(Duration::minutes(11));

    let outcome = h.service.verify_code(&user, action, &code, &ctx()).await.unwrap();
    assert!(!outcome.valid);
    assert!(outcome.needs_resend);
    assert!(!h.store.has_code(&StepUpKey::new(user.id, action)));
}

#[tokio::test]
async fn test_exhausting_attempts_creates_one_block() {
    let config = StepUpConfig {
        max_attempts: 3,
        ..StepUpConfig::default()
    };
    let h = harness(config);
    let user = principal();
    let action = ProtectedAction::ProcessUpdate;

    h.service.issue_code(&user, action, &ctx()).await.unwrap();
    let code = h.notifier.wait_for_code(&user.email).await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let first = h.service.verify_code(&user, action, wrong, &ctx()).await.unwrap();
    assert_eq!(first.remaining_attempts, 2);
    let second = h.service.verify_code(&user, action, wrong, &ctx()).await.unwrap();
    assert_eq!(second.remaining_attempts, 1);
    let third = h.service.verify_code(&user, action, wrong, &ctx()).await.unwrap();
    assert!(!third.valid);
    assert_eq!(third.remaining_attempts, 0);
    assert!(!third.needs_resend);

    let blocks = h.blocks.get_all_blocks();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].user_id, user.id);
    assert_eq!(blocks[0].action, action);
    assert_eq!(blocks[0].ip_address, "203.0.113.7");
    assert_eq!(
        blocks[0].blocked_until,
        h.clock.now() + Duration::minutes(h.config.block_duration_minutes)
    );
}

#[tokio::test]
async fn test_block_takes_precedence_over_correct_code() {
    // Concrete lockout scenario: 3 attempts, 10 minute codes, 15 minute block
    let config = StepUpConfig {
        code_ttl_minutes: 10,
        max_attempts: 3,
        block_duration_minutes: 15,
        ..StepUpConfig::default()
    };
    let h = harness(config);
    let user = principal();
    let action = ProtectedAction::ProcessUpdate;

    h.service.issue_code(&user, action, &ctx()).await.unwrap();
    let code = h.notifier.wait_for_code(&user.email).await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    for _ in 0..3 {
        h.service.verify_code(&user, action, wrong, &ctx()).await.unwrap();
    }

    // Even the genuine code is refused while the block stands
    let result = h.service.verify_code(&user, action, &code, &ctx()).await;
    match result.unwrap_err() {
        DomainError::StepUp(StepUpError::Blocked { blocked_until, .. }) => {
            assert_eq!(blocked_until, h.clock.now() + Duration::minutes(15));
        }
        other => panic!("Expected Blocked, got {:?}", other),
    }

    // Issuing a fresh code is refused too
    let result = h.service.issue_code(&user, action, &ctx()).await;
    assert!(matches!(
        result.unwrap_err(),
        DomainError::StepUp(StepUpError::Blocked { .. })
    ));
}

#[tokio::test]
async fn test_block_scoped_to_action() {
    let config = StepUpConfig {
        max_attempts: 3,
        ..StepUpConfig::default()
    };
    let h = harness(config);
    let user = principal();

    h.service
        .issue_code(&user, ProtectedAction::ProcessDelete, &ctx())
        .await
        .unwrap();
    let code = h.notifier.wait_for_code(&user.email).await;
    let wrong = if code == "000000" { "111111" } else { "000000" };
    for _ in 0..3 {
        h.service
            .verify_code(&user, ProtectedAction::ProcessDelete, wrong, &ctx())
            .await
            .unwrap();
    }

    // A block on process.delete does not touch process.update
    let result = h
        .service
        .issue_code(&user, ProtectedAction::ProcessUpdate, &ctx())
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_audit_trail_for_lifecycle() {
    let config = StepUpConfig {
        max_attempts: 3,
        ..StepUpConfig::default()
    };
    let h = harness(config);
    let user = principal();
    let action = ProtectedAction::ProcessUpdate;

    h.service.issue_code(&user, action, &ctx()).await.unwrap();
    let code = h.notifier.wait_for_code(&user.email).await;
    let wrong = if code == "000000" { "111111" } else { "000000" };
    for _ in 0..3 {
        h.service.verify_code(&user, action, wrong, &ctx()).await.unwrap();
    }

    use crate::repositories::AuditLogRepository;
    assert_eq!(h.audit_repo.logs_for_action(actions::CODE_SENT).len(), 1);
    assert_eq!(h.audit_repo.logs_for_action(actions::VERIFY_FAILED).len(), 3);
    assert_eq!(h.audit_repo.logs_for_action(actions::BLOCK_CREATED).len(), 1);

    let by_user = h.audit_repo.find_by_user(user.id, 10).await.unwrap();
    assert!(!by_user.is_empty());
}

#[tokio::test]
async fn test_dispatch_failure_does_not_fail_issuance() {
    let h = harness_with_notifier(StepUpConfig::default(), MockNotifier::new(true));
    let user = principal();
    let action = ProtectedAction::ProcessUpdate;

    // The stored record, not transport success, is the source of truth
    let result = h.service.issue_code(&user, action, &ctx()).await;
    assert!(result.is_ok());
    assert!(h.store.has_code(&StepUpKey::new(user.id, action)));

    // The dispatch failure lands in the audit trail
    for _ in 0..100 {
        if !h
            .audit_repo
            .logs_for_action(actions::CODE_DISPATCH_FAILED)
            .is_empty()
        {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    assert_eq!(
        h.audit_repo.logs_for_action(actions::CODE_DISPATCH_FAILED).len(),
        1
    );
}

#[tokio::test]
async fn test_store_failure_surfaces_internal_error() {
    let h = harness(StepUpConfig::default());
    let user = principal();
    h.store.set_should_fail(true);

    let result = h
        .service
        .issue_code(&user, ProtectedAction::ProcessUpdate, &ctx())
        .await;
    assert!(matches!(result.unwrap_err(), DomainError::Internal { .. }));
}
