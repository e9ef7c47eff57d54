//! # Infrastructure Layer
//!
//! Concrete storage behind the ReportHub auth stack:
//! - **Database**: MySQL refresh token rows and user accounts via SQLx
//! - **Cache**: Redis client backing refresh sessions and the access token blacklist
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis caching support (default)

use std::sync::Arc;

use rh_core::errors::DomainError;
use rh_core::repositories::{CacheStore, RefreshTokenRepository};
use rh_core::services::{CredentialAuthenticator, UserDirectory};

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Cache module - Redis client and operations
pub mod cache;

/// Configuration module for infrastructure services
pub mod config {
    //! Connection settings for the stores this crate talks to

    pub use rh_shared::config::{CacheConfig, DatabaseConfig};
    use serde::{Deserialize, Serialize};

    /// Infrastructure configuration settings
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct InfrastructureConfig {
        /// Database configuration
        pub database: DatabaseConfig,
        /// Redis cache configuration
        pub cache: CacheConfig,
    }

    impl InfrastructureConfig {
        /// Load from the process environment, reading `.env` first if present
        pub fn from_env() -> Self {
            dotenvy::dotenv().ok();
            Self {
                database: DatabaseConfig::from_env(),
                cache: CacheConfig::from_env(),
            }
        }
    }
}

use crate::cache::RedisClient;
use crate::config::InfrastructureConfig;
use crate::database::{DatabasePool, MySqlRefreshTokenRepository, MySqlUserDirectory};

/// Connected stores, ready to hand to the core services
#[derive(Clone)]
pub struct InfrastructureServices {
    pub database: DatabasePool,
    pub cache: RedisClient,
}

impl InfrastructureServices {
    pub fn cache_store(&self) -> Arc<dyn CacheStore> {
        Arc::new(self.cache.clone())
    }

    pub fn refresh_token_repository(&self) -> Arc<dyn RefreshTokenRepository> {
        Arc::new(MySqlRefreshTokenRepository::new(self.database.get_pool().clone()))
    }

    /// One directory instance serves both credential checks and id lookups
    pub fn user_directory(&self) -> (Arc<dyn CredentialAuthenticator>, Arc<dyn UserDirectory>) {
        let directory = Arc::new(MySqlUserDirectory::new(self.database.get_pool().clone()));
        (directory.clone(), directory)
    }

    /// Ping both stores
    pub async fn health_check(&self) -> bool {
        let database = self.database.health_check().await.unwrap_or(false);
        let cache = self.cache.health_check().await.unwrap_or(false);
        database && cache
    }
}

/// Connect the database pool and the Redis client
pub async fn initialize(
    config: &InfrastructureConfig,
) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!("Initializing infrastructure services...");

    let database = DatabasePool::new(config.database.clone()).await?;
    let cache = RedisClient::new(config.cache.clone()).await?;

    tracing::info!("Infrastructure services initialized successfully");

    Ok(InfrastructureServices { database, cache })
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infrastructure_error_maps_to_storage() {
        let err: DomainError = InfrastructureError::Config("bad url".to_string()).into();
        assert!(err.is_storage());
    }

    #[test]
    fn test_default_config_points_at_local_stores() {
        let config = InfrastructureConfig::default();
        assert!(config.cache.url.starts_with("redis://"));
        assert!(config.database.url.starts_with("mysql://"));
    }
}
