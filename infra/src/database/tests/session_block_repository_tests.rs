//! Integration tests for the MySQL session block repository.
//!
//! These require a MySQL instance with the session_blocks table and are
//! ignored by default; run them with `cargo test -- --ignored` against a
//! database pointed to by DATABASE_URL.

use chrono::{Duration, Utc};
use uuid::Uuid;

use mc_core::domain::entities::SessionBlock;
use mc_core::domain::value_objects::{ProtectedAction, RequestContext};
use mc_core::repositories::SessionBlockRepository;
use mc_shared::config::DatabaseConfig;

use crate::database::{create_pool, MySqlSessionBlockRepository};

#[tokio::test]
#[ignore] // Requires an actual MySQL server
async fn test_insert_and_find_active() {
    let pool = create_pool(&DatabaseConfig::from_env()).await.unwrap();
    let repo = MySqlSessionBlockRepository::new(pool);

    let now = Utc::now();
    let user_id = Uuid::new_v4();
    let ctx = RequestContext::new(None, Some("203.0.113.9".to_string()), None);

    let block = SessionBlock::new(
        user_id,
        ProtectedAction::ProcessUpdate,
        Duration::minutes(15),
        &ctx,
        now,
    );
    repo.insert(&block).await.unwrap();

    let active = repo
        .find_active(user_id, ProtectedAction::ProcessUpdate, now)
        .await
        .unwrap()
        .expect("block should be active");
    assert_eq!(active.id, block.id);
    assert_eq!(active.ip_address, "203.0.113.9");

    // Past the deadline the row stops matching
    let later = now + Duration::minutes(16);
    assert!(repo
        .find_active(user_id, ProtectedAction::ProcessUpdate, later)
        .await
        .unwrap()
        .is_none());
}
