//! Result types for the step-up services.

use chrono::{DateTime, Utc};

/// Result of issuing a one-time code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueOutcome {
    /// When the issued code expires
    pub expires_at: DateTime<Utc>,
    /// When the caller may request another code for the same pair
    pub next_resend_at: DateTime<Utc>,
}

/// Result of a verification attempt.
///
/// Failed attempts are ordinary results, never errors, so callers can
/// render the remaining budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOutcome {
    /// Whether the submitted code matched
    pub valid: bool,
    /// Attempts left for the current code (0 on success or exhaustion)
    pub remaining_attempts: u32,
    /// Whether the caller must request a new code (none on record, or the
    /// stored one expired)
    pub needs_resend: bool,
}

impl VerifyOutcome {
    /// Successful verification
    pub fn verified() -> Self {
        Self {
            valid: true,
            remaining_attempts: 0,
            needs_resend: false,
        }
    }

    /// Rejected attempt with budget left
    pub fn rejected(remaining_attempts: u32) -> Self {
        Self {
            valid: false,
            remaining_attempts,
            needs_resend: false,
        }
    }

    /// Rejected attempt that exhausted the budget (a block now exists)
    pub fn exhausted() -> Self {
        Self {
            valid: false,
            remaining_attempts: 0,
            needs_resend: false,
        }
    }

    /// No usable code on record; a new one must be requested
    pub fn missing_code() -> Self {
        Self {
            valid: false,
            remaining_attempts: 0,
            needs_resend: true,
        }
    }
}
