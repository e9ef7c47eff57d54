//! Redis cache client implementation
//!
//! A multiplexed Redis connection with retry and exponential backoff. It backs
//! the `CacheStore` contract the token lifecycle uses for refresh sessions and
//! the access token blacklist. Every key is namespaced through
//! `CacheConfig::make_key`.

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use rh_core::errors::DomainError;
use rh_core::repositories::CacheStore;

use crate::cache::CacheConfig;
use crate::InfrastructureError;

/// Upper bound for a single backoff sleep
const MAX_RETRY_DELAY_MS: u64 = 5000;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis cache client with connection pooling and retry logic
#[derive(Clone)]
pub struct RedisClient {
    connection: MultiplexedConnection,
    config: CacheConfig,
}

impl RedisClient {
    /// Connect using the retry settings carried by `config`
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(
            "Creating Redis client with URL: {} and max connections: {}",
            mask_url(&config.url),
            config.max_connections
        );

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(&client, &config).await?;

        info!("Redis client created successfully");

        Ok(Self { connection, config })
    }

    async fn create_connection_with_retry(
        client: &Client,
        config: &CacheConfig,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let max_attempts = config.max_retries.max(1);
        let mut attempts = 0;
        let mut delay = config.retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let connect = client.get_multiplexed_async_connection();
            let outcome = tokio::time::timeout(Duration::from_secs(config.connection_timeout), connect)
                .await
                .unwrap_or_else(|_| {
                    Err(RedisError::from(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        "connection timed out",
                    )))
                });

            match outcome {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_attempts => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_attempts, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = next_delay(delay);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Namespaced form of `key`
    pub fn key(&self, key: &str) -> String {
        self.config.make_key(key)
    }

    /// Set a value with expiration time
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        let key = self.key(key);
        debug!(key = %redact_key(&key), expiry_seconds, "Setting key");

        let value = value.to_string();
        self.execute_with_retry(move |mut conn| {
            let key = key.clone();
            let value = value.clone();
            Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry_seconds).await })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    /// Get a value from cache
    pub async fn get(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        let key = self.key(key);
        debug!(key = %redact_key(&key), "Getting key");

        self.execute_with_retry(move |mut conn| {
            let key = key.clone();
            Box::pin(async move { conn.get::<_, Option<String>>(key).await })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    /// Delete a key from cache
    ///
    /// # Returns
    /// * `Ok(true)` - This call removed the key
    /// * `Ok(false)` - Key was already gone
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        let key = self.key(key);
        debug!(key = %redact_key(&key), "Deleting key");

        let deleted = self
            .execute_with_retry(move |mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await
            .map_err(InfrastructureError::Cache)?;

        Ok(deleted > 0)
    }

    /// Check if a key exists in cache
    pub async fn exists(&self, key: &str) -> Result<bool, InfrastructureError> {
        let key = self.key(key);

        self.execute_with_retry(move |mut conn| {
            let key = key.clone();
            Box::pin(async move { conn.exists::<_, bool>(key).await })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    pub async fn set_add(&self, key: &str, member: &str) -> Result<(), InfrastructureError> {
        let key = self.key(key);
        let member = member.to_string();

        self.execute_with_retry(move |mut conn| {
            let key = key.clone();
            let member = member.clone();
            Box::pin(async move { conn.sadd::<_, _, ()>(key, member).await })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    pub async fn set_remove(&self, key: &str, member: &str) -> Result<(), InfrastructureError> {
        let key = self.key(key);
        let member = member.to_string();

        self.execute_with_retry(move |mut conn| {
            let key = key.clone();
            let member = member.clone();
            Box::pin(async move { conn.srem::<_, _, ()>(key, member).await })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    pub async fn set_members(&self, key: &str) -> Result<Vec<String>, InfrastructureError> {
        let key = self.key(key);

        self.execute_with_retry(move |mut conn| {
            let key = key.clone();
            Box::pin(async move { conn.smembers::<_, Vec<String>>(key).await })
        })
        .await
        .map_err(InfrastructureError::Cache)
    }

    /// Get time-to-live for a key
    ///
    /// # Returns
    /// * `Ok(None)` - Key is missing or never expires
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let key = self.key(key);

        let ttl = self
            .execute_with_retry(move |mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.ttl::<_, i64>(key).await })
            })
            .await
            .map_err(InfrastructureError::Cache)?;

        Ok((ttl >= 0).then_some(ttl))
    }

    /// Check if the Redis connection is healthy
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let response = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await
            .map_err(|e| {
                error!("Redis health check failed: {}", e);
                InfrastructureError::Cache(e)
            })?;

        if response == "PONG" {
            Ok(true)
        } else {
            warn!("Redis health check returned unexpected response: {}", response);
            Ok(false)
        }
    }

    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;

            match operation(self.connection.clone()).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < max_attempts && is_retriable_error(&e) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_attempts, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = next_delay(delay);
                }
                Err(e) => {
                    error!("Redis operation failed after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }
}

fn storage_error(err: InfrastructureError) -> DomainError {
    DomainError::from(err)
}

#[async_trait]
impl CacheStore for RedisClient {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        RedisClient::get(self, key).await.map_err(storage_error)
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<(), DomainError> {
        if ttl_secs == 0 {
            return Err(DomainError::Validation {
                message: "cache entries need a positive ttl".to_string(),
            });
        }
        RedisClient::set_with_expiry(self, key, value, ttl_secs)
            .await
            .map_err(storage_error)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        RedisClient::delete(self, key).await.map_err(storage_error)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        RedisClient::exists(self, key).await.map_err(storage_error)
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), DomainError> {
        RedisClient::set_add(self, key, member).await.map_err(storage_error)
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), DomainError> {
        RedisClient::set_remove(self, key, member)
            .await
            .map_err(storage_error)
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, DomainError> {
        RedisClient::set_members(self, key).await.map_err(storage_error)
    }
}

/// Doubled delay, capped
pub(crate) fn next_delay(delay: u64) -> u64 {
    delay.saturating_mul(2).min(MAX_RETRY_DELAY_MS)
}

/// Transient errors worth another attempt
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask credentials in a Redis URL for logging
/// Key with long hex segments (token hashes) cut to an 8 character prefix
pub(crate) fn redact_key(key: &str) -> String {
    key.split(':')
        .map(|segment| {
            if segment.len() > 16 && segment.chars().all(|c| c.is_ascii_hexdigit()) {
                format!("{}..", &segment[..8])
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(":")
}

pub(crate) fn mask_url(url: &str) -> String {
    if let (Some(at_pos), Some(proto_end)) = (url.rfind('@'), url.find("://")) {
        if at_pos > proto_end {
            return format!("{}****{}", &url[..proto_end + 3], &url[at_pos..]);
        }
    }
    url.to_string()
}
