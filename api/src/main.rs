use actix_web::{web, HttpServer};
use std::sync::Arc;
use tracing::{info, warn};

use mc_api::{create_app, AppState};
use mc_core::services::{
    AuditService, Clock, LockoutService, StepUpConfig, StepUpGate, StepUpService, SystemClock,
};
use mc_infra::cache::{RedisClient, RedisStepUpStore};
use mc_infra::database::{
    create_pool, MySqlAuditLogRepository, MySqlProcessRepository, MySqlSessionBlockRepository,
};
use mc_infra::mailer::EmailNotifier;
use mc_shared::config::{AppConfig, LoggingConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env when present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    info!(environment = %config.environment, "Starting MediCase API server");

    if config.environment.is_production() && config.jwt.is_using_default_secret() {
        warn!("JWT_SECRET is not set; refusing to run production with the default secret");
    }

    // Infrastructure
    let pool = create_pool(&config.database).await.map_err(to_io_error)?;
    let redis_client = RedisClient::new(config.cache.clone())
        .await
        .map_err(to_io_error)?;
    let notifier = Arc::new(EmailNotifier::from_env().map_err(to_io_error)?);

    // Repositories
    let store = Arc::new(RedisStepUpStore::new(redis_client));
    let blocks = Arc::new(MySqlSessionBlockRepository::new(pool.clone()));
    let audit_repository = Arc::new(MySqlAuditLogRepository::new(pool.clone()));
    let processes = Arc::new(MySqlProcessRepository::new(pool));

    // Services
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let audit = Arc::new(AuditService::with_defaults(audit_repository));
    let lockout = Arc::new(LockoutService::with_audit(
        blocks,
        Arc::clone(&clock),
        Arc::clone(&audit),
    ));
    let stepup_service = Arc::new(StepUpService::with_audit(
        notifier,
        Arc::clone(&store),
        Arc::clone(&lockout),
        audit,
        clock,
        StepUpConfig::from(&config.stepup),
    ));
    let gate = Arc::new(StepUpGate::new(
        Arc::clone(&stepup_service),
        lockout,
        store,
    ));

    let app_state = web::Data::new(AppState {
        stepup_service,
        gate,
        processes,
    });
    let jwt_config = web::Data::new(config.jwt.clone());

    let bind_address = config.server.bind_address();
    info!(bind_address = %bind_address, "Server binding");

    let workers = config.server.workers;
    let mut server =
        HttpServer::new(move || create_app(app_state.clone(), jwt_config.clone()));
    if workers > 0 {
        server = server.workers(workers);
    }

    server.bind(&bind_address)?.run().await
}

/// Initialize the tracing subscriber from logging configuration
fn init_tracing(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.colored);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Convert startup errors into io::Error for main's signature
fn to_io_error(e: mc_infra::InfrastructureError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}
