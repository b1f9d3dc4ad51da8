//! Narrow interface to the case-record (process) domain.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::DomainError;

/// Partial update applied to a case record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessPatch {
    /// New title, when changing it
    pub title: Option<String>,
    /// New status, when changing it
    pub status: Option<String>,
}

/// Repository trait for the sensitive case-record operations the gate
/// protects. The wider case-management domain is an external collaborator;
/// only the operations that require step-up appear here.
#[async_trait]
pub trait ProcessRepository: Send + Sync {
    /// Apply a partial update to a case record
    ///
    /// # Returns
    /// * `Err(DomainError::NotFound)` if the record does not exist
    async fn update(&self, id: Uuid, patch: ProcessPatch) -> Result<(), DomainError>;

    /// Delete a case record
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;

    /// Transfer a case record to another doctor
    async fn transfer(&self, id: Uuid, to_doctor_id: Uuid) -> Result<(), DomainError>;
}
