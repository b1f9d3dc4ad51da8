//! Durable lockout record for a `(user, action)` pair.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{ProtectedAction, RequestContext};

/// A lockout applied after the verification attempt budget is exhausted.
///
/// Rows are insert-only: a block is never extended or deleted, a new row is
/// created instead, and a block stops mattering once `blocked_until`
/// passes. "Active" is always a query-time judgement, never a stored flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionBlock {
    /// Unique identifier
    pub id: Uuid,

    /// User the block applies to
    pub user_id: Uuid,

    /// Session that triggered the block, when known
    pub session_id: Option<Uuid>,

    /// IP address the failing attempts came from
    pub ip_address: String,

    /// User agent of the failing client, when known
    pub user_agent: Option<String>,

    /// Protected action the block is scoped to
    pub action: ProtectedAction,

    /// Instant the block stops applying
    pub blocked_until: DateTime<Utc>,

    /// Row creation timestamp
    pub created_at: DateTime<Utc>,

    /// Row update timestamp (equal to `created_at`; rows are immutable)
    pub updated_at: DateTime<Utc>,
}

impl SessionBlock {
    /// Create a block lasting `duration` from `now`, carrying the client
    /// context of the attempt that exhausted the budget.
    pub fn new(
        user_id: Uuid,
        action: ProtectedAction,
        duration: Duration,
        ctx: &RequestContext,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            session_id: ctx.session_id,
            ip_address: ctx.ip_or_unknown(),
            user_agent: ctx.user_agent.clone(),
            action,
            blocked_until: now + duration,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the block still applies: `blocked_until` strictly in the future
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.blocked_until > now
    }

    /// Time left until the block lifts, floored at zero.
    ///
    /// Always derived from the caller's `now` so repeated renders reflect
    /// the true countdown.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        let remaining = self.blocked_until - now;
        if remaining < Duration::zero() {
            Duration::zero()
        } else {
            remaining
        }
    }
}
