//! Unit tests for the in-memory cache

use std::sync::Arc;

use chrono::Duration;

use crate::clock::ManualClock;
use crate::repositories::cache::{CacheStore, InMemoryCache};

fn cache() -> (Arc<ManualClock>, InMemoryCache) {
    let clock = Arc::new(ManualClock::default());
    let cache = InMemoryCache::new(clock.clone());
    (clock, cache)
}

#[tokio::test]
async fn test_value_expires_with_clock() {
    let (clock, cache) = cache();

    cache.set_with_expiry("k", "v", 5).await.unwrap();
    assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
    assert_eq!(cache.ttl("k").await, Some(Duration::seconds(5)));

    clock.advance(Duration::seconds(4));
    assert!(cache.exists("k").await.unwrap());

    clock.advance(Duration::seconds(1));
    assert_eq!(cache.get("k").await.unwrap(), None);
    assert!(!cache.exists("k").await.unwrap());
}

#[tokio::test]
async fn test_delete_reports_single_winner() {
    let (_clock, cache) = cache();
    cache.set_with_expiry("k", "v", 60).await.unwrap();

    assert!(cache.delete("k").await.unwrap());
    assert!(!cache.delete("k").await.unwrap());
}

#[tokio::test]
async fn test_set_operations() {
    let (_clock, cache) = cache();

    cache.set_add("s", "b").await.unwrap();
    cache.set_add("s", "a").await.unwrap();
    cache.set_add("s", "a").await.unwrap();
    assert_eq!(cache.set_members("s").await.unwrap(), vec!["a", "b"]);

    cache.set_remove("s", "a").await.unwrap();
    cache.set_remove("s", "b").await.unwrap();
    assert!(cache.set_members("s").await.unwrap().is_empty());
    assert!(!cache.exists("s").await.unwrap());
}

#[tokio::test]
async fn test_write_count_and_zero_ttl() {
    let (_clock, cache) = cache();

    assert!(cache.set_with_expiry("k", "v", 0).await.is_err());
    assert_eq!(cache.write_count(), 0);

    cache.set_with_expiry("k", "v", 1).await.unwrap();
    cache.set_add("s", "m").await.unwrap();
    assert_eq!(cache.write_count(), 1);
}

#[tokio::test]
async fn test_unavailable_cache_errors() {
    let (_clock, cache) = cache();
    cache.set_unavailable(true);

    let err = cache.get("k").await.unwrap_err();
    assert!(err.is_storage());
    assert!(cache.set_with_expiry("k", "v", 1).await.is_err());

    cache.set_unavailable(false);
    assert!(cache.get("k").await.unwrap().is_none());
}

#[tokio::test]
async fn test_evict_bypasses_delete() {
    let (_clock, cache) = cache();
    cache.set_with_expiry("k", "v", 60).await.unwrap();

    cache.evict("k").await;
    assert!(cache.is_empty().await);
}
