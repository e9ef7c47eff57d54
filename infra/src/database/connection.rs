//! MySQL pool behind the refresh token and user directory implementations

use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    ConnectOptions, MySqlPool,
};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::log::LevelFilter;
use tracing::{debug, error, info};

use crate::config::DatabaseConfig;
use crate::InfrastructureError;

#[derive(Clone)]
pub struct DatabasePool {
    pool: MySqlPool,
}

impl DatabasePool {
    /// Open a pool from `config`
    ///
    /// Statements are logged at trace (debug with `enable_logging`) and anything
    /// slower than `slow_query_threshold` at warn.
    pub async fn new(config: DatabaseConfig) -> Result<Self, InfrastructureError> {
        let connect_options = MySqlConnectOptions::from_str(&config.url)
            .map_err(|e| InfrastructureError::Config(format!("Invalid database URL: {}", e)))?
            .log_statements(if config.enable_logging {
                LevelFilter::Debug
            } else {
                LevelFilter::Trace
            })
            .log_slow_statements(
                LevelFilter::Warn,
                Duration::from_millis(config.slow_query_threshold),
            );

        info!(max_connections = config.max_connections, "Opening MySQL pool");
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .max_lifetime(Duration::from_secs(config.max_lifetime))
            .test_before_acquire(true)
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to open MySQL pool");
                InfrastructureError::Database(e)
            })?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn get_pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// `true` when `SELECT 1` round-trips
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let value: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "MySQL health check failed");
                InfrastructureError::Database(e)
            })?;
        debug!(stats = %self.get_statistics(), "MySQL health check");
        Ok(value == 1)
    }

    pub fn get_statistics(&self) -> PoolStatistics {
        PoolStatistics {
            connections: self.pool.size(),
            idle_connections: self.pool.num_idle(),
            max_connections: self.pool.options().get_max_connections(),
        }
    }

    pub async fn close(&self) {
        info!("Closing MySQL pool");
        self.pool.close().await;
    }

    /// Apply the SQL files under `infra/migrations`; already applied ones are skipped
    pub async fn run_migrations(&self) -> Result<(), InfrastructureError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| InfrastructureError::General(format!("Migration failed: {}", e)))?;
        info!("Database migrations applied");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PoolStatistics {
    pub connections: u32,
    pub idle_connections: usize,
    pub max_connections: u32,
}

impl fmt::Display for PoolStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} connections ({} idle)",
            self.connections, self.max_connections, self.idle_connections
        )
    }
}
