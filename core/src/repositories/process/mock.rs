//! Mock implementation of ProcessRepository for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::errors::DomainError;

use super::{ProcessPatch, ProcessRepository};

/// Mock implementation of ProcessRepository for testing
pub struct MockProcessRepository {
    existing: Arc<Mutex<HashSet<Uuid>>>,
    operations: Arc<Mutex<Vec<String>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockProcessRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            existing: Arc::new(Mutex::new(HashSet::new())),
            operations: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Register a process id the mock should treat as existing
    pub fn add_process(&self, id: Uuid) {
        self.existing.lock().unwrap().insert(id);
    }

    /// Set whether operations should fail
    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    /// Operations performed so far, for assertions
    pub fn recorded_operations(&self) -> Vec<String> {
        self.operations.lock().unwrap().clone()
    }

    fn check(&self, id: Uuid, op: &str) -> Result<(), DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::Internal {
                message: "Mock repository error".to_string(),
            });
        }
        if !self.existing.lock().unwrap().contains(&id) {
            return Err(DomainError::NotFound {
                resource: format!("process {}", id),
            });
        }
        self.operations.lock().unwrap().push(format!("{}:{}", op, id));
        Ok(())
    }
}

impl Default for MockProcessRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessRepository for MockProcessRepository {
    async fn update(&self, id: Uuid, _patch: ProcessPatch) -> Result<(), DomainError> {
        self.check(id, "update")
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.check(id, "delete")?;
        self.existing.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn transfer(&self, id: Uuid, _to_doctor_id: Uuid) -> Result<(), DomainError> {
        self.check(id, "transfer")
    }
}
