//! Handler for POST /api/v1/processes/{id}/transfer.

use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;
use uuid::Uuid;

use mc_core::domain::value_objects::ProtectedAction;
use mc_core::repositories::{AuditLogRepository, ProcessRepository, SessionBlockRepository};
use mc_core::services::stepup::{CodeStore, Notifier};
use mc_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::process::{OperationResponse, TransferProcessRequest};
use crate::handlers::ApiError;
use crate::middleware::{request_context, CurrentUser};

/// Transfer a case record to another doctor, gated on step-up verification
pub async fn transfer_process<N, C, B, A, P>(
    req: HttpRequest,
    user: CurrentUser,
    state: web::Data<AppState<N, C, B, A, P>>,
    path: web::Path<Uuid>,
    body: web::Json<TransferProcessRequest>,
) -> Result<HttpResponse, ApiError>
where
    N: Notifier + 'static,
    C: CodeStore + 'static,
    B: SessionBlockRepository + 'static,
    A: AuditLogRepository + 'static,
    P: ProcessRepository + 'static,
{
    let ctx = request_context(&req);
    let id = path.into_inner();
    let to_doctor_id = body.to_doctor_id;
    let processes = Arc::clone(&state.processes);

    state
        .gate
        .guard(&user.0, ProtectedAction::ProcessTransfer, &ctx, move || async move {
            processes.transfer(id, to_doctor_id).await
        })
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(OperationResponse {
        message: format!("Process {} transferred", id),
    })))
}
