//! Step-up specific error types.
//!
//! Attempt tracking never surfaces through these errors: failed attempts
//! come back as structured results so callers can render the remaining
//! budget. Only structural failures (no principal, unknown action, active
//! lockout, missing verification) raise at the gate boundary.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::value_objects::ProtectedAction;

/// Errors raised by the step-up authentication gate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepUpError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Unknown protected action: {action}")]
    InvalidAction { action: String },

    #[error("Action {action} is blocked until {blocked_until}")]
    Blocked {
        action: ProtectedAction,
        blocked_until: DateTime<Utc>,
    },

    #[error("Verification required to {}", .action.label())]
    VerificationRequired { action: ProtectedAction },

    #[error("No verification code on record")]
    CodeNotFound,

    #[error("Verification code expired")]
    CodeExpired,

    #[error("Verification code dispatch failed")]
    NotificationFailure,
}

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Invalid length: {field} (expected: {expected}, actual: {actual})")]
    InvalidLength {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Rate limit exceeded, retry in {retry_after_seconds} seconds")]
    RateLimitExceeded { retry_after_seconds: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_required_uses_label() {
        let err = StepUpError::VerificationRequired {
            action: ProtectedAction::ProcessDelete,
        };
        assert!(err.to_string().contains("delete a case record"));
    }

    #[test]
    fn test_blocked_carries_deadline() {
        let until: DateTime<Utc> = "2026-03-01T10:15:00Z".parse().unwrap();
        let err = StepUpError::Blocked {
            action: ProtectedAction::ProcessUpdate,
            blocked_until: until,
        };
        match err {
            StepUpError::Blocked { blocked_until, .. } => assert_eq!(blocked_until, until),
            _ => unreachable!(),
        }
    }
}
