//! Protected action identifiers for step-up authentication.

use serde::{Deserialize, Serialize};

use crate::errors::StepUpError;

/// A sensitive case-record operation guarded by step-up verification.
///
/// The set is closed: every code and every block is namespaced by one of
/// these values, so blocking `process.delete` for a user never affects
/// `process.update` for the same user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtectedAction {
    /// Updating the contents of a case record
    #[serde(rename = "process.update")]
    ProcessUpdate,

    /// Deleting a case record
    #[serde(rename = "process.delete")]
    ProcessDelete,

    /// Transferring a case record to another doctor
    #[serde(rename = "process.transfer")]
    ProcessTransfer,
}

impl ProtectedAction {
    /// All recognized protected actions
    pub const ALL: [ProtectedAction; 3] = [
        ProtectedAction::ProcessUpdate,
        ProtectedAction::ProcessDelete,
        ProtectedAction::ProcessTransfer,
    ];

    /// Stable wire identifier for the action
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtectedAction::ProcessUpdate => "process.update",
            ProtectedAction::ProcessDelete => "process.delete",
            ProtectedAction::ProcessTransfer => "process.transfer",
        }
    }

    /// Human-readable label used in notification emails and API responses
    pub fn label(&self) -> &'static str {
        match self {
            ProtectedAction::ProcessUpdate => "update a case record",
            ProtectedAction::ProcessDelete => "delete a case record",
            ProtectedAction::ProcessTransfer => "transfer a case record",
        }
    }

    /// Parse a wire identifier, rejecting anything outside the closed set
    pub fn parse(value: &str) -> Result<Self, StepUpError> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == value)
            .ok_or_else(|| StepUpError::InvalidAction {
                action: value.to_string(),
            })
    }
}

impl std::fmt::Display for ProtectedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProtectedAction {
    type Err = StepUpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_actions() {
        assert_eq!(
            ProtectedAction::parse("process.update").unwrap(),
            ProtectedAction::ProcessUpdate
        );
        assert_eq!(
            ProtectedAction::parse("process.delete").unwrap(),
            ProtectedAction::ProcessDelete
        );
        assert_eq!(
            ProtectedAction::parse("process.transfer").unwrap(),
            ProtectedAction::ProcessTransfer
        );
    }

    #[test]
    fn test_parse_unknown_action() {
        let err = ProtectedAction::parse("doctor.update").unwrap_err();
        match err {
            StepUpError::InvalidAction { action } => assert_eq!(action, "doctor.update"),
            other => panic!("Expected InvalidAction, got {:?}", other),
        }
    }

    #[test]
    fn test_round_trip_all_actions() {
        for action in ProtectedAction::ALL {
            assert_eq!(ProtectedAction::parse(action.as_str()).unwrap(), action);
        }
    }

    #[test]
    fn test_serde_uses_wire_identifier() {
        let json = serde_json::to_string(&ProtectedAction::ProcessDelete).unwrap();
        assert_eq!(json, "\"process.delete\"");
        let back: ProtectedAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ProtectedAction::ProcessDelete);
    }
}
