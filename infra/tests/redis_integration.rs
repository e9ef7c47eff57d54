//! Integration tests for the Redis-backed token stores
//!
//! These tests require a running Redis instance to execute.
//! Run with: cargo test -p rh_infra --test redis_integration -- --ignored

use std::sync::Arc;

use chrono::{Duration, Utc};
use rh_core::repositories::{CacheStore, InMemoryRefreshTokenRepository};
use rh_core::services::token::create_refresh_token;
use rh_core::services::{AccessTokenBlacklist, RefreshTokenStore};
use rh_infra::cache::{CacheConfig, RedisClient};

async fn client() -> RedisClient {
    let config = CacheConfig::new(
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
    )
    .with_prefix(format!("rh-it-{}", uuid::Uuid::new_v4()));

    RedisClient::new(config).await.expect("Failed to connect to Redis")
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_redis_connection() {
    let client = client().await;
    assert!(client.health_check().await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_expiry() {
    let client = client().await;

    client.set_with_expiry("auth:blacklist:jti:x", "1", 1).await.unwrap();
    assert!(client.exists("auth:blacklist:jti:x").await.unwrap());

    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;

    assert!(!client.exists("auth:blacklist:jti:x").await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_refresh_rotation_is_single_use() {
    let cache: Arc<dyn CacheStore> = Arc::new(client().await);
    let repository = Arc::new(InMemoryRefreshTokenRepository::new());
    let store = RefreshTokenStore::new(cache, repository, Duration::days(14));
    let now = Utc::now();

    let first = store
        .create(7, create_refresh_token(), "laptop".to_string(), None, None, now)
        .await
        .unwrap();

    let second_token = create_refresh_token();
    let rotated = store.rotate(&first.token, second_token.clone(), now).await.unwrap();
    assert_eq!(rotated.device_id, "laptop");

    assert!(store.rotate(&first.token, create_refresh_token(), now).await.is_err());
    assert!(store.load_valid(&second_token, now).await.is_ok());

    let sessions = store.list_sessions(7, now).await.unwrap();
    assert_eq!(sessions.len(), 1);
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_blacklist_and_logout_all_marker() {
    let cache: Arc<dyn CacheStore> = Arc::new(client().await);
    let blacklist = AccessTokenBlacklist::new(cache, Duration::minutes(30));
    let now = Utc::now();

    assert!(blacklist.blacklist("jti-1", now + Duration::minutes(5), now).await.unwrap());
    assert!(blacklist.is_blacklisted("jti-1").await.unwrap());
    assert!(!blacklist.is_blacklisted("jti-2").await.unwrap());

    blacklist.mark_logout_all(7, now).await.unwrap();
    let cutoff = blacklist.get_logout_all_at(7).await.unwrap().unwrap();
    assert_eq!(cutoff.timestamp_millis(), now.timestamp_millis());
}
