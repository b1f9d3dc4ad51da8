//! DTOs for the protected case-record endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request body for PATCH /api/v1/processes/{id}
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProcessRequest {
    /// New title, when changing it
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    /// New status, when changing it
    #[validate(length(min = 1, max = 32))]
    pub status: Option<String>,
}

/// Request body for POST /api/v1/processes/{id}/transfer
#[derive(Debug, Deserialize)]
pub struct TransferProcessRequest {
    /// Doctor receiving the case record
    pub to_doctor_id: Uuid,
}

/// Generic confirmation payload for completed operations
#[derive(Debug, Serialize)]
pub struct OperationResponse {
    /// Confirmation message
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_validation() {
        let ok = UpdateProcessRequest {
            title: Some("Knee surgery follow-up".to_string()),
            status: None,
        };
        assert!(ok.validate().is_ok());

        let empty_title = UpdateProcessRequest {
            title: Some(String::new()),
            status: None,
        };
        assert!(empty_title.validate().is_err());
    }
}
