//! MySQL implementation of the AuditLogRepository trait.
//!
//! Audit entries are stored in the `stepup_audit_log` table for immutable
//! security tracking of code sends, verification attempts and lockouts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use mc_core::domain::entities::AuditLog;
use mc_core::errors::DomainError;
use mc_core::repositories::AuditLogRepository;

/// MySQL implementation of AuditLogRepository
pub struct MySqlAuditLogRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlAuditLogRepository {
    /// Create a new MySQL audit log repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to an AuditLog entity
    fn row_to_audit_log(row: &sqlx::mysql::MySqlRow) -> Result<AuditLog, DomainError> {
        let id: String = row.try_get("id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get id: {}", e),
        })?;
        let user_id: Option<String> =
            row.try_get("user_id").map_err(|e| DomainError::Internal {
                message: format!("Failed to get user_id: {}", e),
            })?;

        Ok(AuditLog {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid audit UUID: {}", e),
            })?,
            action: row.try_get("action").map_err(|e| DomainError::Internal {
                message: format!("Failed to get action: {}", e),
            })?,
            success: row.try_get("success").map_err(|e| DomainError::Internal {
                message: format!("Failed to get success: {}", e),
            })?,
            user_id: user_id
                .map(|u| Uuid::parse_str(&u))
                .transpose()
                .map_err(|e| DomainError::Internal {
                    message: format!("Invalid user UUID: {}", e),
                })?,
            ip_address: row.try_get("ip_address").map_err(|e| DomainError::Internal {
                message: format!("Failed to get ip_address: {}", e),
            })?,
            user_agent: row.try_get("user_agent").map_err(|e| DomainError::Internal {
                message: format!("Failed to get user_agent: {}", e),
            })?,
            error_message: row
                .try_get("error_message")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get error_message: {}", e),
                })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                })?,
        })
    }
}

#[async_trait]
impl AuditLogRepository for MySqlAuditLogRepository {
    async fn create(&self, audit_log: &AuditLog) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO stepup_audit_log (
                id, action, success, user_id, ip_address, user_agent,
                error_message, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(audit_log.id.to_string())
            .bind(&audit_log.action)
            .bind(audit_log.success)
            .bind(audit_log.user_id.map(|u| u.to_string()))
            .bind(&audit_log.ip_address)
            .bind(&audit_log.user_agent)
            .bind(&audit_log.error_message)
            .bind(audit_log.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to insert audit log: {}", e),
            })?;

        Ok(())
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError> {
        let query = r#"
            SELECT id, action, success, user_id, ip_address, user_agent,
                   error_message, created_at
            FROM stepup_audit_log
            WHERE user_id = ?
            ORDER BY created_at DESC
            LIMIT ?
        "#;

        let rows = sqlx::query(query)
            .bind(user_id.to_string())
            .bind(limit as u64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to query audit logs: {}", e),
            })?;

        rows.iter().map(Self::row_to_audit_log).collect()
    }
}
