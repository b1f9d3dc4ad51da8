//! MySQL implementation of the ProcessRepository trait.
//!
//! Only the sensitive operations the step-up gate protects are implemented
//! here; the rest of the case-management domain lives in its own service.

use async_trait::async_trait;
use sqlx::MySqlPool;
use uuid::Uuid;

use mc_core::errors::DomainError;
use mc_core::repositories::{ProcessPatch, ProcessRepository};

/// MySQL implementation of ProcessRepository
pub struct MySqlProcessRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlProcessRepository {
    /// Create a new MySQL process repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcessRepository for MySqlProcessRepository {
    async fn update(&self, id: Uuid, patch: ProcessPatch) -> Result<(), DomainError> {
        let query = r#"
            UPDATE processes
            SET title = COALESCE(?, title),
                status = COALESCE(?, status),
                updated_at = NOW(6)
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(patch.title)
            .bind(patch.status)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to update process: {}", e),
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound {
                resource: format!("process {}", id),
            });
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM processes WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to delete process: {}", e),
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound {
                resource: format!("process {}", id),
            });
        }

        Ok(())
    }

    async fn transfer(&self, id: Uuid, to_doctor_id: Uuid) -> Result<(), DomainError> {
        let query = r#"
            UPDATE processes
            SET doctor_id = ?, updated_at = NOW(6)
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(to_doctor_id.to_string())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to transfer process: {}", e),
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound {
                resource: format!("process {}", id),
            });
        }

        Ok(())
    }
}
