//! Unit tests for the audit service.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::audit::actions;
use crate::domain::value_objects::{ProtectedAction, RequestContext};
use crate::repositories::MockAuditLogRepository;
use crate::services::audit::{AuditService, AuditServiceConfig};

fn sync_service(repo: Arc<MockAuditLogRepository>) -> AuditService<MockAuditLogRepository> {
    AuditService::new(repo, AuditServiceConfig { async_writes: false })
}

fn ctx() -> RequestContext {
    RequestContext::new(None, Some("198.51.100.4".to_string()), Some("agent".to_string()))
}

#[tokio::test]
async fn test_log_code_sent_records_context() {
    let repo = Arc::new(MockAuditLogRepository::new());
    let service = sync_service(Arc::clone(&repo));
    let user_id = Uuid::new_v4();

    service
        .log_code_sent(user_id, ProtectedAction::ProcessUpdate, &ctx())
        .await
        .unwrap();

    let logs = repo.logs_for_action(actions::CODE_SENT);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].user_id, Some(user_id));
    assert_eq!(logs[0].ip_address.as_deref(), Some("198.51.100.4"));
    assert!(logs[0].success);
}

#[tokio::test]
async fn test_log_verify_failed_keeps_reason() {
    let repo = Arc::new(MockAuditLogRepository::new());
    let service = sync_service(Arc::clone(&repo));

    service
        .log_verify_failed(Uuid::new_v4(), ProtectedAction::ProcessDelete, &ctx(), "code mismatch")
        .await
        .unwrap();

    let logs = repo.logs_for_action(actions::VERIFY_FAILED);
    assert_eq!(logs.len(), 1);
    assert!(!logs[0].success);
    assert!(logs[0].error_message.as_deref().unwrap().contains("code mismatch"));
    assert!(logs[0].error_message.as_deref().unwrap().contains("process.delete"));
}

#[tokio::test]
async fn test_repository_failure_is_swallowed() {
    let repo = Arc::new(MockAuditLogRepository::new());
    repo.set_should_fail(true);
    let service = sync_service(Arc::clone(&repo));

    // Audit failures must never fail the business flow they describe
    let result = service
        .log_code_verified(Uuid::new_v4(), ProtectedAction::ProcessUpdate, &ctx())
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_async_writes_eventually_land() {
    let repo = Arc::new(MockAuditLogRepository::new());
    let service = AuditService::with_defaults(Arc::clone(&repo));

    service
        .log_block_created(
            Uuid::new_v4(),
            ProtectedAction::ProcessUpdate,
            &ctx(),
            chrono::Utc::now() + chrono::Duration::minutes(30),
        )
        .await
        .unwrap();

    for _ in 0..100 {
        if !repo.logs_for_action(actions::BLOCK_CREATED).is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    assert_eq!(repo.logs_for_action(actions::BLOCK_CREATED).len(), 1);
}
