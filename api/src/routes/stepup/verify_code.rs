//! Handler for POST /api/v1/stepup/verify.

use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use mc_core::domain::value_objects::ProtectedAction;
use mc_core::repositories::{AuditLogRepository, ProcessRepository, SessionBlockRepository};
use mc_core::services::stepup::{CodeStore, Notifier};
use mc_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::stepup::{VerifyCodeRequest, VerifyCodeResponse};
use crate::handlers::ApiError;
use crate::middleware::{request_context, CurrentUser};

/// Verify a submitted one-time code for a protected action.
///
/// A wrong code is a 200 with `valid: false` and the remaining budget, so
/// clients can render "N attempts remaining"; only structural failures
/// (unknown action, active lockout) surface as HTTP errors.
pub async fn verify_code<N, C, B, A, P>(
    req: HttpRequest,
    user: CurrentUser,
    state: web::Data<AppState<N, C, B, A, P>>,
    body: web::Json<VerifyCodeRequest>,
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
        .verify_code(&user.0, action, &body.code, &ctx)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(VerifyCodeResponse {
        valid: outcome.valid,
        remaining_attempts: outcome.remaining_attempts,
        needs_resend: outcome.needs_resend,
    })))
}
