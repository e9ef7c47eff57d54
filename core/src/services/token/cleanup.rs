//! Periodic sweep of expired durable refresh tokens
//!
//! Validity never depends on this sweep; `expires_at` checks and cache TTLs already
//! gate every read. It only keeps the refresh token table from growing unbounded.

use std::sync::Arc;
use std::time::Duration;

use rh_shared::config::TokenCleanupSettings;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::errors::DomainResult;

use super::refresh_store::RefreshTokenStore;

#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    pub interval_seconds: u64,
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            enabled: true,
        }
    }
}

impl From<&TokenCleanupSettings> for TokenCleanupConfig {
    fn from(settings: &TokenCleanupSettings) -> Self {
        Self {
            interval_seconds: settings.interval_seconds.max(1),
            enabled: settings.enabled,
        }
    }
}

pub struct TokenCleanupService {
    store: Arc<RefreshTokenStore>,
    clock: Arc<dyn Clock>,
    config: TokenCleanupConfig,
}

impl TokenCleanupService {
    pub fn new(store: Arc<RefreshTokenStore>, clock: Arc<dyn Clock>, config: TokenCleanupConfig) -> Self {
        Self { store, clock, config }
    }

    /// Delete refresh tokens whose `expires_at` has passed
    ///
    /// # Returns
    /// Rows removed; always 0 when cleanup is disabled
    pub async fn run_cleanup(&self) -> DomainResult<usize> {
        if !self.config.enabled {
            return Ok(0);
        }

        let deleted = self.store.purge_expired(self.clock.now()).await?;
        if deleted > 0 {
            info!(deleted, "Purged expired refresh tokens");
        } else {
            debug!("No expired refresh tokens to purge");
        }
        Ok(deleted)
    }

    /// Spawn the sweep loop; the first cycle runs immediately
    ///
    /// Returns `None` when cleanup is disabled. A failed cycle is logged and the
    /// loop carries on with the next tick.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Refresh token cleanup is disabled");
            return None;
        }

        let period = Duration::from_secs(self.config.interval_seconds);
        info!(interval_seconds = self.config.interval_seconds, "Starting refresh token cleanup");

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = self.run_cleanup().await {
                    warn!(error = %e, "Refresh token cleanup cycle failed");
                }
            }
        }))
    }
}
