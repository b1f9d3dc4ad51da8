//! # Infrastructure Layer
//!
//! Concrete implementations of the interfaces the MediCase core defines:
//!
//! - **Database**: MySQL repositories using SQLx (session blocks, audit
//!   log, case-record operations)
//! - **Cache**: Redis-backed verification store for one-time codes,
//!   attempt counters and verified markers
//! - **Mailer**: email delivery of one-time codes over the Mailgun HTTP
//!   API, with a mock provider for development

/// Cache module - Redis client and verification store
pub mod cache;

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Mailer module - email notifier implementations
pub mod mailer;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mail service error
    #[error("Mail service error: {0}")]
    Mail(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}
