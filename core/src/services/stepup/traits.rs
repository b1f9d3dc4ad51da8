//! Traits for notification and verification-store integration.

use async_trait::async_trait;

use crate::domain::entities::StepUpCode;
use crate::domain::value_objects::StepUpKey;

/// Trait for delivering one-time codes out-of-band (email)
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a code, returning the provider's message id.
    ///
    /// The message should name the action (via its human label) and the
    /// validity window so the recipient knows what they are approving.
    async fn send_code(
        &self,
        email: &str,
        code: &str,
        action_label: &str,
        validity_minutes: i64,
    ) -> Result<String, String>;
}

/// Trait for the TTL-capable key/value store backing codes, attempt
/// counters and verified markers.
///
/// Implementations must make [`consume_attempt`](CodeStore::consume_attempt)
/// atomic per key: two concurrent failed attempts must observe distinct
/// counter values, otherwise both could pass an "attempts remain" check and
/// evade lockout.
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Store a code record with a TTL, resetting the attempt counter to
    /// `max_attempts`. Overwrites any previous record for the key.
    async fn put_code(
        &self,
        key: &StepUpKey,
        record: &StepUpCode,
        ttl_seconds: u64,
        max_attempts: u32,
    ) -> Result<(), String>;

    /// Fetch the current code record for a key, if one exists
    async fn get_code(&self, key: &StepUpKey) -> Result<Option<StepUpCode>, String>;

    /// Remove the code record and its attempt counter
    async fn remove_code(&self, key: &StepUpKey) -> Result<(), String>;

    /// Atomically consume one attempt, returning the remaining budget
    /// (0 when exhausted or when no counter exists)
    async fn consume_attempt(&self, key: &StepUpKey) -> Result<u32, String>;

    /// Create a verified marker with a TTL
    async fn put_verified(&self, key: &StepUpKey, ttl_seconds: u64) -> Result<(), String>;

    /// Check whether an unconsumed verified marker exists
    async fn is_verified(&self, key: &StepUpKey) -> Result<bool, String>;

    /// Consume (delete) the verified marker
    async fn remove_verified(&self, key: &StepUpKey) -> Result<(), String>;
}
