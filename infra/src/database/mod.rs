//! Database module - MySQL implementations using SQLx.

pub mod mysql;

#[cfg(test)]
mod tests;

pub use mysql::{MySqlAuditLogRepository, MySqlProcessRepository, MySqlSessionBlockRepository};

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::InfrastructureError;
use mc_shared::config::DatabaseConfig;

/// Create a MySQL connection pool from configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<MySqlPool, InfrastructureError> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout))
        .idle_timeout(Duration::from_secs(config.idle_timeout))
        .max_lifetime(Duration::from_secs(config.max_lifetime))
        .connect(&config.url)
        .await?;

    info!(
        max_connections = config.max_connections,
        "MySQL connection pool created"
    );

    Ok(pool)
}
