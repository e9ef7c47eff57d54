//! Shared configuration and common types for the ReportHub server
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - The JSON error response structure and error codes

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, DatabaseConfig, Environment, JwtConfig,
    LoggingConfig, RefreshCookieConfig, ServerConfig, TokenCleanupSettings,
};
pub use errors::{error_codes, ErrorResponse};
