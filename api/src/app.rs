//! Application state and factory.
//!
//! Builds the actix application around a fully wired set of step-up
//! services; the concrete service types are injected by `main` (or by
//! tests, with mocks).

use actix_web::{web, App, HttpResponse};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use mc_core::repositories::{AuditLogRepository, ProcessRepository, SessionBlockRepository};
use mc_core::services::stepup::{CodeStore, Notifier, StepUpGate, StepUpService};
use mc_shared::config::JwtConfig;

use crate::middleware::create_cors;
use crate::routes::processes::{
    delete::delete_process, transfer::transfer_process, update::update_process,
};
use crate::routes::stepup::{send_code::send_code, verify_code::verify_code};

/// Application state holding the shared services
pub struct AppState<N, C, B, A, P>
where
    N: Notifier,
    C: CodeStore,
    B: SessionBlockRepository,
    A: AuditLogRepository + 'static,
    P: ProcessRepository,
{
    /// Step-up service for code issuance and verification
    pub stepup_service: Arc<StepUpService<N, C, B, A>>,
    /// Gate wrapping the protected operations
    pub gate: Arc<StepUpGate<N, C, B, A>>,
    /// Narrow seam into the case-record domain
    pub processes: Arc<P>,
}

/// Create and configure the application with all dependencies
pub fn create_app<N, C, B, A, P>(
    app_state: web::Data<AppState<N, C, B, A, P>>,
    jwt_config: web::Data<JwtConfig>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<
            actix_web::body::EitherBody<
                tracing_actix_web::StreamSpan<actix_web::body::BoxBody>,
            >,
        >,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    N: Notifier + 'static,
    C: CodeStore + 'static,
    B: SessionBlockRepository + 'static,
    A: AuditLogRepository + 'static,
    P: ProcessRepository + 'static,
{
    let cors = create_cors();

    App::new()
        .app_data(app_state)
        .app_data(jwt_config)
        .wrap(TracingLogger::default())
        .wrap(cors)
        // Health check endpoint
        .route("/health", web::get().to(health_check))
        // API v1 routes
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/stepup")
                        .route("/send-code", web::post().to(send_code::<N, C, B, A, P>))
                        .route("/verify", web::post().to(verify_code::<N, C, B, A, P>)),
                )
                .service(
                    web::scope("/processes")
                        .route("/{id}", web::patch().to(update_process::<N, C, B, A, P>))
                        .route("/{id}", web::delete().to(delete_process::<N, C, B, A, P>))
                        .route(
                            "/{id}/transfer",
                            web::post().to(transfer_process::<N, C, B, A, P>),
                        ),
                ),
        )
        // Default 404 handler
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "medicase-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "not_found",
        "message": "The requested resource was not found"
    }))
}
