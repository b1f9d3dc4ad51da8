//! Handler for PATCH /api/v1/processes/{id}.

use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use mc_core::domain::value_objects::ProtectedAction;
use mc_core::repositories::{
    AuditLogRepository, ProcessPatch, ProcessRepository, SessionBlockRepository,
};
use mc_core::services::stepup::{CodeStore, Notifier};
use mc_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::process::{OperationResponse, UpdateProcessRequest};
use crate::handlers::ApiError;
use crate::middleware::{request_context, CurrentUser};

/// Update a case record, gated on step-up verification
pub async fn update_process<N, C, B, A, P>(
    req: HttpRequest,
    user: CurrentUser,
    state: web::Data<AppState<N, C, B, A, P>>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProcessRequest>,
) -> Result<HttpResponse, ApiError>
where
    N: Notifier + 'static,
    C: CodeStore + 'static,
    B: SessionBlockRepository + 'static,
    A: AuditLogRepository + 'static,
    P: ProcessRepository + 'static,
{
    body.validate().map_err(|e| ApiError::validation(&e))?;

    let ctx = request_context(&req);
    let id = path.into_inner();
    let patch = ProcessPatch {
        title: body.title.clone(),
        status: body.status.clone(),
    };
    let processes = Arc::clone(&state.processes);

    state
        .gate
        .guard(&user.0, ProtectedAction::ProcessUpdate, &ctx, move || async move {
            processes.update(id, patch).await
        })
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(OperationResponse {
        message: format!("Process {} updated", id),
    })))
}
