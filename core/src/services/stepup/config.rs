//! Configuration for the step-up services.

use chrono::Duration;
use mc_shared::config::StepUpPolicy;

/// Configuration for code issuance, verification and lockout
#[derive(Debug, Clone)]
pub struct StepUpConfig {
    /// Minutes before an issued code expires
    pub code_ttl_minutes: i64,
    /// Maximum verification attempts per issued code
    pub max_attempts: u32,
    /// Minutes a pair stays blocked after exhausting attempts
    pub block_duration_minutes: i64,
    /// Minutes an unused verified marker stays valid
    pub verified_ttl_minutes: i64,
    /// Minimum seconds between two code sends for the same pair
    pub resend_cooldown_seconds: i64,
}

impl Default for StepUpConfig {
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

impl StepUpConfig {
    /// Code lifetime as a duration
    pub fn code_ttl(&self) -> Duration {
        Duration::minutes(self.code_ttl_minutes)
    }

    /// Code lifetime in whole seconds, for TTL-capable stores
    pub fn code_ttl_seconds(&self) -> u64 {
        (self.code_ttl_minutes * 60).max(0) as u64
    }

    /// Block duration as a duration
    pub fn block_duration(&self) -> Duration {
        Duration::minutes(self.block_duration_minutes)
    }

    /// Verified marker lifetime in whole seconds
    pub fn verified_ttl_seconds(&self) -> u64 {
        (self.verified_ttl_minutes * 60).max(0) as u64
    }

    /// Resend cooldown as a duration
    pub fn resend_cooldown(&self) -> Duration {
        Duration::seconds(self.resend_cooldown_seconds)
    }
}

impl From<&StepUpPolicy> for StepUpConfig {
    fn from(policy: &StepUpPolicy) -> Self {
        Self {
            code_ttl_minutes: policy.code_ttl_minutes,
            max_attempts: policy.max_attempts,
            block_duration_minutes: policy.block_duration_minutes,
            verified_ttl_minutes: policy.verified_ttl_minutes,
            resend_cooldown_seconds: policy.resend_cooldown_seconds,
        }
    }
}
