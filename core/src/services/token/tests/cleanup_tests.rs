//! Tests for the expired refresh token sweep

use std::sync::Arc;

use chrono::Duration;

use crate::services::token::{create_refresh_token, TokenCleanupConfig, TokenCleanupService};
use crate::testing::TestAuthStack;

async fn expired_row(stack: &TestAuthStack) {
    stack
        .refresh_store
        .create(1, create_refresh_token(), "d".to_string(), None, None, stack.now())
        .await
        .unwrap();
    stack.clock.advance(stack.config.refresh_token_lifetime() + Duration::seconds(1));
}

fn service(stack: &TestAuthStack, enabled: bool) -> Arc<TokenCleanupService> {
    Arc::new(TokenCleanupService::new(
        stack.refresh_store.clone(),
        stack.clock.clone(),
        TokenCleanupConfig {
            interval_seconds: 60,
            enabled,
        },
    ))
}

#[tokio::test]
async fn test_run_cleanup_deletes_expired_rows() {
    let stack = TestAuthStack::new();
    expired_row(&stack).await;

    assert_eq!(service(&stack, true).run_cleanup().await.unwrap(), 1);
    assert!(stack.repository.is_empty().await);
    assert_eq!(service(&stack, true).run_cleanup().await.unwrap(), 0);
}

#[tokio::test]
async fn test_run_cleanup_surfaces_storage_errors() {
    let stack = TestAuthStack::new();
    stack.repository.set_unavailable(true);

    let err = service(&stack, true).run_cleanup().await.unwrap_err();
    assert!(err.is_storage());
}

#[tokio::test]
async fn test_disabled_cleanup_does_nothing() {
    let stack = TestAuthStack::new();
    expired_row(&stack).await;

    let service = service(&stack, false);
    assert_eq!(service.run_cleanup().await.unwrap(), 0);
    assert!(service.start_background_task().is_none());
    assert_eq!(stack.repository.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_background_task_runs_on_interval() {
    let stack = TestAuthStack::new();
    expired_row(&stack).await;

    let handle = service(&stack, true).start_background_task().unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    assert!(stack.repository.is_empty().await);

    expired_row(&stack).await;
    tokio::time::sleep(std::time::Duration::from_secs(61)).await;
    assert!(stack.repository.is_empty().await);

    handle.abort();
}
