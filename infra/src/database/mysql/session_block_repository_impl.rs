//! MySQL implementation of the SessionBlockRepository trait.
//!
//! Blocks live in the `session_blocks` table:
//!
//! ```sql
//! CREATE TABLE session_blocks (
//!     id            CHAR(36)    NOT NULL PRIMARY KEY,
//!     user_id       CHAR(36)    NOT NULL,
//!     session_id    CHAR(36)    NULL,
//!     ip_address    VARCHAR(45) NOT NULL,
//!     user_agent    TEXT        NULL,
//!     action        VARCHAR(64) NOT NULL,
//!     blocked_until DATETIME(6) NOT NULL,
//!     created_at    DATETIME(6) NOT NULL,
//!     updated_at    DATETIME(6) NOT NULL,
//!     INDEX idx_session_blocks_active (user_id, action, blocked_until)
//! );
//! ```
//!
//! Rows are insert-only; expiry is decided by the query, never by mutation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use mc_core::domain::entities::SessionBlock;
use mc_core::domain::value_objects::ProtectedAction;
use mc_core::errors::DomainError;
use mc_core::repositories::SessionBlockRepository;

/// MySQL implementation of SessionBlockRepository
pub struct MySqlSessionBlockRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlSessionBlockRepository {
    /// Create a new MySQL session block repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a SessionBlock entity
    fn row_to_block(row: &sqlx::mysql::MySqlRow) -> Result<SessionBlock, DomainError> {
        let id: String = row.try_get("id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get id: {}", e),
        })?;
        let user_id: String = row.try_get("user_id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get user_id: {}", e),
        })?;
        let session_id: Option<String> =
            row.try_get("session_id").map_err(|e| DomainError::Internal {
                message: format!("Failed to get session_id: {}", e),
            })?;
        let action: String = row.try_get("action").map_err(|e| DomainError::Internal {
            message: format!("Failed to get action: {}", e),
        })?;

        Ok(SessionBlock {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid block UUID: {}", e),
            })?,
            user_id: Uuid::parse_str(&user_id).map_err(|e| DomainError::Internal {
                message: format!("Invalid user UUID: {}", e),
            })?,
            session_id: session_id
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .map_err(|e| DomainError::Internal {
                    message: format!("Invalid session UUID: {}", e),
                })?,
            ip_address: row.try_get("ip_address").map_err(|e| DomainError::Internal {
                message: format!("Failed to get ip_address: {}", e),
            })?,
            user_agent: row.try_get("user_agent").map_err(|e| DomainError::Internal {
                message: format!("Failed to get user_agent: {}", e),
            })?,
            action: ProtectedAction::parse(&action).map_err(|_| DomainError::Internal {
                message: format!("Unknown action in session_blocks: {}", action),
            })?,
            blocked_until: row
                .try_get::<DateTime<Utc>, _>("blocked_until")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get blocked_until: {}", e),
                })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                })?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get updated_at: {}", e),
                })?,
        })
    }
}

#[async_trait]
impl SessionBlockRepository for MySqlSessionBlockRepository {
    async fn insert(&self, block: &SessionBlock) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO session_blocks (
                id, user_id, session_id, ip_address, user_agent,
                action, blocked_until, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(block.id.to_string())
            .bind(block.user_id.to_string())
            .bind(block.session_id.map(|s| s.to_string()))
            .bind(&block.ip_address)
            .bind(&block.user_agent)
            .bind(block.action.as_str())
            .bind(block.blocked_until)
            .bind(block.created_at)
            .bind(block.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to insert session block: {}", e),
            })?;

        Ok(())
    }

    async fn find_active(
        &self,
        user_id: Uuid,
        action: ProtectedAction,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionBlock>, DomainError> {
        // Order by blocked_until, not created_at: with varying durations
        // the furthest deadline governs even when it was created earlier.
        let query = r#"
            SELECT id, user_id, session_id, ip_address, user_agent,
                   action, blocked_until, created_at, updated_at
            FROM session_blocks
            WHERE user_id = ? AND action = ? AND blocked_until > ?
            ORDER BY blocked_until DESC
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(user_id.to_string())
            .bind(action.as_str())
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to query active session block: {}", e),
            })?;

        row.map(|r| Self::row_to_block(&r)).transpose()
    }
}
