//! Mock implementation of SessionBlockRepository for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::entities::SessionBlock;
use crate::domain::value_objects::ProtectedAction;
use crate::errors::DomainError;

use super::SessionBlockRepository;

/// Mock implementation of SessionBlockRepository for testing
pub struct MockSessionBlockRepository {
    blocks: Arc<Mutex<Vec<SessionBlock>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockSessionBlockRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            blocks: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Set whether operations should fail
    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    /// Get all stored blocks for testing
    pub fn get_all_blocks(&self) -> Vec<SessionBlock> {
        self.blocks.lock().unwrap().clone()
    }
}

impl Default for MockSessionBlockRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionBlockRepository for MockSessionBlockRepository {
    async fn insert(&self, block: &SessionBlock) -> Result<(), DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::Internal {
                message: "Mock repository error".to_string(),
            });
        }

        self.blocks.lock().unwrap().push(block.clone());
        Ok(())
    }

    async fn find_active(
        &self,
        user_id: Uuid,
        action: ProtectedAction,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionBlock>, DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::Internal {
                message: "Mock repository error".to_string(),
            });
        }

        let blocks = self.blocks.lock().unwrap();
        let active = blocks
            .iter()
            .filter(|b| b.user_id == user_id && b.action == action && b.is_active(now))
            .max_by_key(|b| b.blocked_until)
            .cloned();

        Ok(active)
    }
}
