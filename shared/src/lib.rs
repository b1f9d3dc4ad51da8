//! Shared utilities and common types for the MediCase server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Common API response structures

pub mod config;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, CorsConfig, DatabaseConfig, Environment, JwtConfig, LoggingConfig,
    ServerConfig, StepUpPolicy,
};
pub use types::ApiResponse;
