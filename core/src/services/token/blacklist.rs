//! Access token revocation records
//!
//! Two kinds of entry, both self-expiring:
//! - `auth:blacklist:jti:{jti}` marks one access token as revoked until it would
//!   have expired anyway
//! - `auth:logout_all:{user_id}` holds a cutoff in epoch milliseconds; every token
//!   of that user issued before it is revoked

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::{debug, info};

use crate::errors::{DomainError, DomainResult};
use crate::repositories::CacheStore;

const JTI_KEY_PREFIX: &str = "auth:blacklist:jti:";
const LOGOUT_ALL_KEY_PREFIX: &str = "auth:logout_all:";

fn jti_key(jti: &str) -> String {
    format!("{}{}", JTI_KEY_PREFIX, jti)
}

fn logout_all_key(user_id: i64) -> String {
    format!("{}{}", LOGOUT_ALL_KEY_PREFIX, user_id)
}

pub struct AccessTokenBlacklist {
    cache: Arc<dyn CacheStore>,
    /// Longest lifetime any access token can have
    max_access_lifetime: Duration,
}

impl AccessTokenBlacklist {
    pub fn new(cache: Arc<dyn CacheStore>, max_access_lifetime: Duration) -> Self {
        Self {
            cache,
            max_access_lifetime,
        }
    }

    /// Revoke one access token until `expires_at`
    ///
    /// Does nothing for a token that has already expired. Returns whether a
    /// tombstone was written.
    pub async fn blacklist(&self, jti: &str, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> DomainResult<bool> {
        if expires_at <= now {
            debug!(jti, "Access token already expired, not blacklisting");
            return Ok(false);
        }

        // Round up so the tombstone never lapses before the token does
        let remaining_ms = (expires_at - now).num_milliseconds();
        let ttl = ((remaining_ms + 999) / 1000).max(1) as u64;

        self.cache.set_with_expiry(&jti_key(jti), "1", ttl).await?;
        debug!(jti, ttl, "Access token blacklisted");
        Ok(true)
    }

    /// Revoke every access token of `user_id` issued before `now`
    pub async fn mark_logout_all(&self, user_id: i64, now: DateTime<Utc>) -> DomainResult<()> {
        let ttl = self.max_access_lifetime.num_seconds().max(1) as u64;
        self.cache
            .set_with_expiry(&logout_all_key(user_id), &now.timestamp_millis().to_string(), ttl)
            .await?;

        info!(user_id, cutoff = %now, "Logout-all cutoff recorded");
        Ok(())
    }

    pub async fn is_blacklisted(&self, jti: &str) -> DomainResult<bool> {
        self.cache.exists(&jti_key(jti)).await
    }

    /// Current logout-all cutoff of a user, if one is still live
    pub async fn get_logout_all_at(&self, user_id: i64) -> DomainResult<Option<DateTime<Utc>>> {
        let Some(raw) = self.cache.get(&logout_all_key(user_id)).await? else {
            return Ok(None);
        };

        raw.trim()
            .parse::<i64>()
            .ok()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .map(Some)
            .ok_or_else(|| DomainError::storage(format!("Malformed logout-all cutoff for user {}", user_id)))
    }
}
