//! Mapping of domain errors onto HTTP responses.
//!
//! Lockout responses recompute the remaining wait from the deadline at
//! render time, never at error-construction time, so repeated polling
//! reflects the true countdown.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::Utc;

use mc_core::errors::{DomainError, StepUpError, ValidationError};
use mc_shared::types::{ApiResponse, ErrorBody};

/// Wrapper turning a [`DomainError`] into an actix response
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<StepUpError> for ApiError {
    fn from(err: StepUpError) -> Self {
        Self(DomainError::StepUp(err))
    }
}

impl ApiError {
    /// Build a 400 response from request validation failures
    pub fn validation(errors: &validator::ValidationErrors) -> Self {
        Self(DomainError::Validation {
            message: errors.to_string().replace('\n', "; "),
        })
    }

    fn error_body(&self) -> ErrorBody {
        match &self.0 {
            DomainError::StepUp(StepUpError::Unauthenticated) => {
                ErrorBody::new("UNAUTHENTICATED", self.to_string())
            }
            DomainError::StepUp(StepUpError::InvalidAction { action }) => {
                ErrorBody::new("INVALID_ACTION", self.to_string())
                    .with_detail("action", serde_json::json!(action))
            }
            DomainError::StepUp(StepUpError::Blocked {
                action,
                blocked_until,
            }) => {
                // Render-time recomputation: this body is rebuilt for every
                // response, so the countdown is always current.
                let remaining_seconds =
                    (*blocked_until - Utc::now()).num_seconds().max(0);
                let remaining_minutes = (remaining_seconds + 59) / 60;

                ErrorBody::new(
                    "BLOCKED",
                    format!(
                        "Too many failed attempts; try again in {} minutes",
                        remaining_minutes
                    ),
                )
                .with_detail("action", serde_json::json!(action.as_str()))
                .with_detail("blocked_until", serde_json::json!(blocked_until))
                .with_detail("minutes_remaining", serde_json::json!(remaining_minutes))
                .with_detail("seconds_remaining", serde_json::json!(remaining_seconds))
            }
            DomainError::StepUp(StepUpError::VerificationRequired { action }) => {
                ErrorBody::new(
                    "VERIFICATION_REQUIRED",
                    format!(
                        "A verification code has been sent to your email to {}",
                        action.label()
                    ),
                )
                .with_detail("action", serde_json::json!(action.as_str()))
                .with_detail("label", serde_json::json!(action.label()))
            }
            DomainError::StepUp(StepUpError::CodeNotFound)
            | DomainError::StepUp(StepUpError::CodeExpired) => {
                ErrorBody::new("CODE_NOT_FOUND", self.to_string())
            }
            DomainError::StepUp(StepUpError::NotificationFailure) => {
                ErrorBody::new("NOTIFICATION_FAILURE", self.to_string())
            }
            DomainError::ValidationErr(ValidationError::RateLimitExceeded {
                retry_after_seconds,
            }) => ErrorBody::new("RATE_LIMITED", self.to_string())
                .with_detail("retry_after", serde_json::json!(retry_after_seconds)),
            DomainError::ValidationErr(_) | DomainError::Validation { .. } => {
                ErrorBody::new("VALIDATION_ERROR", self.to_string())
            }
            DomainError::NotFound { .. } => ErrorBody::new("NOT_FOUND", self.to_string()),
            DomainError::Internal { .. } => {
                // Never leak internal detail to clients
                ErrorBody::new("INTERNAL_ERROR", "An internal error occurred")
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            DomainError::StepUp(StepUpError::Unauthenticated) => StatusCode::UNAUTHORIZED,
            DomainError::StepUp(StepUpError::InvalidAction { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            DomainError::StepUp(StepUpError::Blocked { .. }) => StatusCode::LOCKED,
            DomainError::StepUp(StepUpError::VerificationRequired { .. }) => {
                StatusCode::PRECONDITION_REQUIRED
            }
            DomainError::StepUp(StepUpError::CodeNotFound)
            | DomainError::StepUp(StepUpError::CodeExpired) => StatusCode::GONE,
            DomainError::StepUp(StepUpError::NotificationFailure) => StatusCode::BAD_GATEWAY,
            DomainError::ValidationErr(ValidationError::RateLimitExceeded { .. }) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            DomainError::ValidationErr(_) | DomainError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.0, DomainError::Internal { .. }) {
            tracing::error!(error = %self.0, "Request failed with internal error");
        }
        HttpResponse::build(self.status_code())
            .json(ApiResponse::<()>::error(self.error_body()))
    }
}
