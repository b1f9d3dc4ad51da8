//! Redis client wrapper with connection management and typed operations.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::InfrastructureError;
use mc_shared::config::CacheConfig;

/// Redis client for cache operations.
///
/// Wraps a [`ConnectionManager`] (which multiplexes and reconnects
/// automatically) and applies the configured key prefix to every key.
#[derive(Clone)]
pub struct RedisClient {
    /// Managed Redis connection
    manager: ConnectionManager,
    /// Cache configuration (URL, prefix)
    config: CacheConfig,
}

impl RedisClient {
    /// Create a new Redis client and establish the managed connection
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        let client = redis::Client::open(config.url.clone())?;
        let manager = ConnectionManager::new(client).await?;

        info!(url = %config.url, "Redis client initialized");

        Ok(Self { manager, config })
    }

    /// Apply the configured key prefix
    fn prefixed(&self, key: &str) -> String {
        self.config.make_key(key)
    }

    /// Get a string value
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(self.prefixed(key)).await?;
        Ok(value)
    }

    /// Set a string value with an expiry in seconds
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        let mut conn = self.manager.clone();
        redis::cmd("SETEX")
            .arg(self.prefixed(key))
            .arg(ttl_seconds)
            .arg(value)
            .query_async::<_, ()>(&mut conn)
            .await?;
        debug!(key = key, ttl_seconds = ttl_seconds, "Stored key with expiry");
        Ok(())
    }

    /// Delete a key
    pub async fn delete(&self, key: &str) -> Result<(), InfrastructureError> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(self.prefixed(key)).await?;
        Ok(())
    }

    /// Check whether a key exists
    pub async fn exists(&self, key: &str) -> Result<bool, InfrastructureError> {
        let mut conn = self.manager.clone();
        let exists: bool = conn.exists(self.prefixed(key)).await?;
        Ok(exists)
    }

    /// Remaining TTL for a key in seconds, `None` when the key is missing
    /// or has no expiry
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let mut conn = self.manager.clone();
        let ttl: i64 = conn.ttl(self.prefixed(key)).await?;
        if ttl < 0 {
            Ok(None)
        } else {
            Ok(Some(ttl))
        }
    }

    /// Atomically decrement a counter, returning the new value.
    ///
    /// DECR is a single Redis command, so concurrent callers always observe
    /// distinct results; the caller never needs a read-modify-write cycle.
    pub async fn decr(&self, key: &str) -> Result<i64, InfrastructureError> {
        let mut conn = self.manager.clone();
        let value: i64 = conn.decr(self.prefixed(key), 1).await?;
        Ok(value)
    }
}
