//! DTOs for the step-up verification endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for POST /api/v1/stepup/send-code
#[derive(Debug, Deserialize, Validate)]
pub struct SendCodeRequest {
    /// Protected action identifier (e.g. "process.delete")
    #[validate(length(min = 1, max = 64))]
    pub action: String,
}

/// Response body after a code send
#[derive(Debug, Serialize)]
pub struct SendCodeResponse {
    /// Confirmation message
    pub message: String,
    /// When the issued code expires
    pub expires_at: DateTime<Utc>,
    /// Seconds until another code may be requested
    pub resend_after: i64,
}

/// Request body for POST /api/v1/stepup/verify.
///
/// The code field is deliberately not length-validated here: a wrong-shaped
/// code must reach the verifier and consume an attempt like any other
/// mismatch.
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyCodeRequest {
    /// Protected action identifier
    #[validate(length(min = 1, max = 64))]
    pub action: String,
    /// The submitted one-time code
    pub code: String,
}

/// Response body for a verification attempt
#[derive(Debug, Serialize)]
pub struct VerifyCodeResponse {
    /// Whether the submitted code matched
    pub valid: bool,
    /// Attempts left for the current code
    pub remaining_attempts: u32,
    /// Whether a new code must be requested
    pub needs_resend: bool,
}
