//! Redis implementation of the step-up verification store.
//!
//! Key layout, all scoped to a `(user, action)` pair:
//! - `stepup:code:{user_id}:{action}` - JSON code record, expires with the code
//! - `stepup:attempts:{user_id}:{action}` - remaining attempt counter, same TTL
//! - `stepup:verified:{user_id}:{action}` - verified marker with its own TTL
//!
//! The attempt counter is consumed with DECR, so two concurrent failed
//! attempts can never observe the same remaining count.

use async_trait::async_trait;
use tracing::{debug, warn};

use mc_core::domain::entities::StepUpCode;
use mc_core::domain::value_objects::StepUpKey;
use mc_core::services::stepup::CodeStore;

use crate::cache::RedisClient;

/// Redis-backed store for codes, attempt counters and verified markers
#[derive(Clone)]
pub struct RedisStepUpStore {
    /// Redis client for cache operations
    redis_client: RedisClient,
}

impl RedisStepUpStore {
    /// Create a new store on top of a Redis client
    pub fn new(redis_client: RedisClient) -> Self {
        Self { redis_client }
    }

    /// Key for the code record
    pub(crate) fn code_key(key: &StepUpKey) -> String {
        format!("stepup:code:{}", key)
    }

    /// Key for the attempt counter
    pub(crate) fn attempts_key(key: &StepUpKey) -> String {
        format!("stepup:attempts:{}", key)
    }

    /// Key for the verified marker
    pub(crate) fn verified_key(key: &StepUpKey) -> String {
        format!("stepup:verified:{}", key)
    }
}

#[async_trait]
impl CodeStore for RedisStepUpStore {
    async fn put_code(
        &self,
        key: &StepUpKey,
        record: &StepUpCode,
        ttl_seconds: u64,
        max_attempts: u32,
    ) -> Result<(), String> {
        let record_json = serde_json::to_string(record)
            .map_err(|e| format!("Failed to serialize code record: {}", e))?;

        self.redis_client
            .set_with_expiry(&Self::code_key(key), &record_json, ttl_seconds)
            .await
            .map_err(|e| e.to_string())?;

        // Reset the attempt budget under the same TTL as the code
        self.redis_client
            .set_with_expiry(&Self::attempts_key(key), &max_attempts.to_string(), ttl_seconds)
            .await
            .map_err(|e| e.to_string())?;

        debug!(pair = %key, ttl_seconds = ttl_seconds, "Stored step-up code record");
        Ok(())
    }

    async fn get_code(&self, key: &StepUpKey) -> Result<Option<StepUpCode>, String> {
        match self
            .redis_client
            .get(&Self::code_key(key))
            .await
            .map_err(|e| e.to_string())?
        {
            Some(record_json) => {
                let record: StepUpCode = serde_json::from_str(&record_json)
                    .map_err(|e| format!("Failed to deserialize code record: {}", e))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn remove_code(&self, key: &StepUpKey) -> Result<(), String> {
        self.redis_client
            .delete(&Self::code_key(key))
            .await
            .map_err(|e| e.to_string())?;
        self.redis_client
            .delete(&Self::attempts_key(key))
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    async fn consume_attempt(&self, key: &StepUpKey) -> Result<u32, String> {
        let remaining = self
            .redis_client
            .decr(&Self::attempts_key(key))
            .await
            .map_err(|e| e.to_string())?;

        // DECR on a missing (expired) counter creates it at -1; clean that
        // up and report an exhausted budget.
        if remaining < 0 {
            warn!(pair = %key, "Attempt counter missing; treating budget as exhausted");
            let _ = self.redis_client.delete(&Self::attempts_key(key)).await;
            return Ok(0);
        }

        Ok(remaining as u32)
    }

    async fn put_verified(&self, key: &StepUpKey, ttl_seconds: u64) -> Result<(), String> {
        self.redis_client
            .set_with_expiry(&Self::verified_key(key), "1", ttl_seconds)
            .await
            .map_err(|e| e.to_string())
    }

    async fn is_verified(&self, key: &StepUpKey) -> Result<bool, String> {
        self.redis_client
            .exists(&Self::verified_key(key))
            .await
            .map_err(|e| e.to_string())
    }

    async fn remove_verified(&self, key: &StepUpKey) -> Result<(), String> {
        self.redis_client
            .delete(&Self::verified_key(key))
            .await
            .map_err(|e| e.to_string())
    }
}
