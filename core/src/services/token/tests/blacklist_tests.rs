//! Tests for access token blacklist and logout-all cutoffs

use chrono::Duration;

use crate::repositories::CacheStore;
use crate::testing::TestAuthStack;

#[tokio::test]
async fn test_blacklist_expires_with_token() {
    let stack = TestAuthStack::new();
    let now = stack.now();

    let written = stack
        .blacklist
        .blacklist("jti-1", now + Duration::seconds(5), now)
        .await
        .unwrap();
    assert!(written);
    assert!(stack.blacklist.is_blacklisted("jti-1").await.unwrap());
    assert_eq!(
        stack.cache.ttl("auth:blacklist:jti:jti-1").await,
        Some(Duration::seconds(5))
    );

    stack.clock.advance(Duration::seconds(5));
    assert!(!stack.blacklist.is_blacklisted("jti-1").await.unwrap());
}

#[tokio::test]
async fn test_blacklist_ttl_rounds_up() {
    let stack = TestAuthStack::new();
    let now = stack.now();

    stack
        .blacklist
        .blacklist("jti-2", now + Duration::milliseconds(1500), now)
        .await
        .unwrap();

    stack.clock.advance(Duration::milliseconds(1500));
    // Token is dead; the tombstone may outlive it but never the reverse
    assert!(stack.blacklist.is_blacklisted("jti-2").await.unwrap());
    stack.clock.advance(Duration::milliseconds(500));
    assert!(!stack.blacklist.is_blacklisted("jti-2").await.unwrap());
}

#[tokio::test]
async fn test_expired_token_is_not_written() {
    let stack = TestAuthStack::new();
    let now = stack.now();
    let writes = stack.cache.write_count();

    assert!(!stack.blacklist.blacklist("old", now, now).await.unwrap());
    assert!(!stack
        .blacklist
        .blacklist("older", now - Duration::seconds(30), now)
        .await
        .unwrap());

    assert_eq!(stack.cache.write_count(), writes);
    assert!(!stack.blacklist.is_blacklisted("old").await.unwrap());
}

#[tokio::test]
async fn test_logout_all_cutoff_lifetime() {
    let stack = TestAuthStack::new();
    let now = stack.now();

    assert!(stack.blacklist.get_logout_all_at(9).await.unwrap().is_none());

    stack.blacklist.mark_logout_all(9, now).await.unwrap();
    assert_eq!(stack.blacklist.get_logout_all_at(9).await.unwrap(), Some(now));
    assert_eq!(
        stack.cache.ttl("auth:logout_all:9").await,
        Some(stack.config.access_token_lifetime())
    );

    stack.clock.advance(stack.config.access_token_lifetime());
    assert!(stack.blacklist.get_logout_all_at(9).await.unwrap().is_none());
}

#[tokio::test]
async fn test_later_logout_all_moves_cutoff() {
    let stack = TestAuthStack::new();
    let first = stack.now();
    stack.blacklist.mark_logout_all(9, first).await.unwrap();

    stack.clock.advance(Duration::minutes(10));
    let second = stack.now();
    stack.blacklist.mark_logout_all(9, second).await.unwrap();

    assert_eq!(stack.blacklist.get_logout_all_at(9).await.unwrap(), Some(second));
}

#[tokio::test]
async fn test_malformed_cutoff_is_storage_error() {
    let stack = TestAuthStack::new();
    stack
        .cache
        .set_with_expiry("auth:logout_all:4", "yesterday", 60)
        .await
        .unwrap();

    let err = stack.blacklist.get_logout_all_at(4).await.unwrap_err();
    assert!(err.is_storage());
}
