//! Composite key for step-up verification state.

use uuid::Uuid;

use super::action::ProtectedAction;

/// Key addressing all step-up state for one `(user, action)` pair.
///
/// Codes, attempt counters, verified markers and blocks are all scoped to
/// this pair. A typed key rather than ad hoc string concatenation keeps
/// differently shaped actions from ever colliding in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepUpKey {
    /// The authenticated user the state belongs to
    pub user_id: Uuid,
    /// The protected action being verified
    pub action: ProtectedAction,
}

impl StepUpKey {
    /// Create a key for a `(user, action)` pair
    pub fn new(user_id: Uuid, action: ProtectedAction) -> Self {
        Self { user_id, action }
    }
}

impl std::fmt::Display for StepUpKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.user_id, self.action)
    }
}
