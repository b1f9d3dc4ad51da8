//! Step-up verification policy configuration
//!
//! Controls the one-time code lifecycle (TTL, attempt budget, resend
//! cooldown) and the lockout applied when the attempt budget is exhausted.

use serde::{Deserialize, Serialize};

/// Policy for step-up verification of sensitive actions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StepUpPolicy {
    /// Minutes before an issued code expires
    pub code_ttl_minutes: i64,

    /// Maximum verification attempts per issued code
    pub max_attempts: u32,

    /// Minutes a (user, action) pair stays blocked after exhausting attempts
    pub block_duration_minutes: i64,

    /// Minutes a verified marker stays usable if the protected call never runs
    pub verified_ttl_minutes: i64,

    /// Minimum seconds between two code sends for the same pair
    pub resend_cooldown_seconds: i64,
}

impl Default for StepUpPolicy {
    fn default() -> Self {
        Self {
            code_ttl_minutes: 10,
            max_attempts: 5,
            block_duration_minutes: 30,
            verified_ttl_minutes: 30,
            resend_cooldown_seconds: 60,
        }
    }
}

impl StepUpPolicy {
    /// Create from environment variables
    pub fn from_env() -> Self {
        fn var_or<T: std::str::FromStr>(name: &str, default: T) -> T {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        Self {
            code_ttl_minutes: var_or("STEPUP_CODE_TTL_MINUTES", 10),
            max_attempts: var_or("STEPUP_MAX_ATTEMPTS", 5),
            block_duration_minutes: var_or("STEPUP_BLOCK_DURATION_MINUTES", 30),
            verified_ttl_minutes: var_or("STEPUP_VERIFIED_TTL_MINUTES", 30),
            resend_cooldown_seconds: var_or("STEPUP_RESEND_COOLDOWN_SECONDS", 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let policy = StepUpPolicy::default();
        assert_eq!(policy.code_ttl_minutes, 10);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.block_duration_minutes, 30);
        assert!(policy.verified_ttl_minutes <= 30);
    }
}
