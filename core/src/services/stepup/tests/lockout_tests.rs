//! Unit tests for the lockout engine.

use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::value_objects::{ProtectedAction, RequestContext};
use crate::repositories::MockSessionBlockRepository;
use crate::services::clock::Clock;
use crate::services::stepup::LockoutService;

use super::mocks::ManualClock;

fn setup() -> (
    Arc<ManualClock>,
    Arc<MockSessionBlockRepository>,
    LockoutService<MockSessionBlockRepository>,
) {
    let clock = Arc::new(ManualClock::starting_at_epoch());
    let blocks = Arc::new(MockSessionBlockRepository::new());
    let lockout = LockoutService::new(Arc::clone(&blocks), clock.clone() as Arc<dyn Clock>);
    (clock, blocks, lockout)
}

fn ctx() -> RequestContext {
    RequestContext::new(
        Some(Uuid::new_v4()),
        Some("198.51.100.4".to_string()),
        Some("test-agent".to_string()),
    )
}

#[tokio::test]
async fn test_block_then_is_blocked() {
    let (clock, _, lockout) = setup();
    let user_id = Uuid::new_v4();

    let created = lockout
        .block(user_id, ProtectedAction::ProcessUpdate, Duration::minutes(15), &ctx())
        .await
        .unwrap();
    assert_eq!(created.blocked_until, clock.now() + Duration::minutes(15));

    let active = lockout
        .is_blocked(user_id, ProtectedAction::ProcessUpdate)
        .await
        .unwrap()
        .expect("block should be active");
    assert_eq!(active.id, created.id);

    // Scoped per action
    assert!(lockout
        .is_blocked(user_id, ProtectedAction::ProcessDelete)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_furthest_deadline_governs() {
    let (_, _, lockout) = setup();
    let user_id = Uuid::new_v4();
    let action = ProtectedAction::ProcessDelete;

    lockout.block(user_id, action, Duration::minutes(30), &ctx()).await.unwrap();
    // A later, shorter block does not shorten the lockout
    lockout.block(user_id, action, Duration::minutes(5), &ctx()).await.unwrap();

    let active = lockout.is_blocked(user_id, action).await.unwrap().unwrap();
    assert_eq!(active.remaining(active.created_at), Duration::minutes(30));
}

#[tokio::test]
async fn test_block_expires_by_query_time() {
    let (clock, blocks, lockout) = setup();
    let user_id = Uuid::new_v4();
    let action = ProtectedAction::ProcessUpdate;

    lockout.block(user_id, action, Duration::minutes(15), &ctx()).await.unwrap();
    clock.advance(Duration::minutes(16));

    assert!(lockout.is_blocked(user_id, action).await.unwrap().is_none());
    // The row itself is never deleted
    assert_eq!(blocks.get_all_blocks().len(), 1);
}

#[tokio::test]
async fn test_block_rows_are_insert_only() {
    let (_, blocks, lockout) = setup();
    let user_id = Uuid::new_v4();
    let action = ProtectedAction::ProcessUpdate;

    lockout.block(user_id, action, Duration::minutes(15), &ctx()).await.unwrap();
    lockout.block(user_id, action, Duration::minutes(15), &ctx()).await.unwrap();

    assert_eq!(blocks.get_all_blocks().len(), 2);
}

#[tokio::test]
async fn test_block_carries_request_context() {
    let (_, blocks, lockout) = setup();
    let context = ctx();

    lockout
        .block(Uuid::new_v4(), ProtectedAction::ProcessTransfer, Duration::minutes(30), &context)
        .await
        .unwrap();

    let stored = &blocks.get_all_blocks()[0];
    assert_eq!(stored.ip_address, "198.51.100.4");
    assert_eq!(stored.user_agent.as_deref(), Some("test-agent"));
    assert_eq!(stored.session_id, context.session_id);
}
