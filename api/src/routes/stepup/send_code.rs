//! Handler for POST /api/v1/stepup/send-code.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use validator::Validate;

use mc_core::domain::value_objects::ProtectedAction;
use mc_core::repositories::{AuditLogRepository, ProcessRepository, SessionBlockRepository};
use mc_core::services::stepup::{CodeStore, Notifier};
use mc_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::stepup::{SendCodeRequest, SendCodeResponse};
use crate::handlers::ApiError;
use crate::middleware::{request_context, CurrentUser};

/// Send a one-time code for a protected action to the caller's email.
///
/// Fails with 422 for an action outside the recognized set, 423 while the
/// pair is blocked, and 429 inside the resend cooldown.
pub async fn send_code<N, C, B, A, P>(
    req: HttpRequest,
    user: CurrentUser,
    state: web::Data<AppState<N, C, B, A, P>>,
    body: web::Json<SendCodeRequest>,
) -> Result<HttpResponse, ApiError>
where
    N: Notifier + 'static,
    C: CodeStore + 'static,
    B: SessionBlockRepository + 'static,
    A: AuditLogRepository + 'static,
    P: ProcessRepository + 'static,
{
    body.validate().map_err(|e| ApiError::validation(&e))?;

    let action = ProtectedAction::parse(&body.action)?;
    let ctx = request_context(&req);

    let outcome = state
        .stepup_service
        .issue_code(&user.0, action, &ctx)
        .await?;

    let resend_after = (outcome.next_resend_at - Utc::now()).num_seconds().max(0);

    Ok(HttpResponse::Ok().json(ApiResponse::success(SendCodeResponse {
        message: format!(
            "A verification code has been sent to your email to {}",
            action.label()
        ),
        expires_at: outcome.expires_at,
        resend_after,
    })))
}
