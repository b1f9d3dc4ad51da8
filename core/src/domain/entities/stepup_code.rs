//! One-time code entity for step-up verification.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::value_objects::ProtectedAction;

/// Length of the one-time code
pub const CODE_LENGTH: usize = 6;

/// One-time code issued for a `(user, action)` pair.
///
/// Only the SHA-256 hash of the code is kept; the plaintext exists exactly
/// once, in the notification email. The record lives in the verification
/// store under the pair's key and is destroyed on expiry, on successful
/// verification, or when the attempt budget is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepUpCode {
    /// Unique identifier for this issuance
    pub id: Uuid,

    /// User the code was issued to
    pub user_id: Uuid,

    /// Protected action the code unlocks
    pub action: ProtectedAction,

    /// SHA-256 hex digest of the 6-digit code
    pub code_hash: String,

    /// Timestamp when the code was issued
    pub created_at: DateTime<Utc>,

    /// Timestamp when the code expires
    pub expires_at: DateTime<Utc>,
}

impl StepUpCode {
    /// Issue a fresh code for a `(user, action)` pair.
    ///
    /// Returns the entity (holding the hash) together with the plaintext
    /// code for dispatch. `now` is injected so expiry arithmetic stays
    /// deterministic under test.
    pub fn issue(
        user_id: Uuid,
        action: ProtectedAction,
        ttl_minutes: i64,
        now: DateTime<Utc>,
    ) -> (Self, String) {
        let code = Self::generate_code();
        let record = Self {
            id: Uuid::new_v4(),
            user_id,
            action,
            code_hash: Self::hash_code(&code),
            created_at: now,
            expires_at: now + Duration::minutes(ttl_minutes),
        };
        (record, code)
    }

    /// Generate a 6-digit code from the OS CSPRNG.
    ///
    /// The modulo introduces a negligible bias for 6-digit codes.
    pub fn generate_code() -> String {
        let mut rng = OsRng;
        let mut bytes = [0u8; 4];
        rng.fill_bytes(&mut bytes);
        let num = u32::from_le_bytes(bytes) % 1_000_000;
        format!("{:06}", num)
    }

    /// SHA-256 hex digest of a code
    pub fn hash_code(code: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(code.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Check whether the code has expired
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Compare a submitted code against the stored hash in constant time.
    ///
    /// Wrong-shaped input is not rejected early; it simply hashes to a
    /// non-matching digest, so every comparison takes the same path.
    pub fn matches(&self, submitted: &str) -> bool {
        let submitted_hash = Self::hash_code(submitted);
        constant_time_eq(self.code_hash.as_bytes(), submitted_hash.as_bytes())
    }
}
