//! Session block repository trait defining the interface for lockout persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::SessionBlock;
use crate::domain::value_objects::ProtectedAction;
use crate::errors::DomainError;

/// Repository trait for SessionBlock persistence.
///
/// The table is insert-only: blocks are created and read, never mutated or
/// deleted. Expiry is a property of the query, not of the row.
#[async_trait]
pub trait SessionBlockRepository: Send + Sync {
    /// Insert a new block row
    ///
    /// # Arguments
    /// * `block` - The block to persist
    ///
    /// # Returns
    /// * `Ok(())` on successful creation
    /// * `Err(DomainError)` if the operation fails
    async fn insert(&self, block: &SessionBlock) -> Result<(), DomainError>;

    /// Find the governing active block for a `(user, action)` pair.
    ///
    /// Active means `blocked_until` strictly after `now`; when several rows
    /// qualify the one with the greatest `blocked_until` governs (not the
    /// most recently created one, which matters if durations ever vary).
    ///
    /// # Arguments
    /// * `user_id` - The user to check
    /// * `action` - The protected action the block is scoped to
    /// * `now` - The instant to evaluate "active" against
    async fn find_active(
        &self,
        user_id: Uuid,
        action: ProtectedAction,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionBlock>, DomainError>;
}
