//! Refresh token store: cache fast path over the durable system of record
//!
//! Cache layout:
//! - `refresh:token:{sha256}` holds the session record as JSON, expiring with it
//! - `refresh:user:{user_id}` is the set of token hashes for that user
//!
//! The raw token never reaches either store.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::domain::entities::token::{RefreshTokenRecord, StoredRefreshToken};
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::{CacheStore, RefreshTokenRepository};

const TOKEN_KEY_PREFIX: &str = "refresh:token:";
const USER_KEY_PREFIX: &str = "refresh:user:";

/// SHA-256 hex digest used as the storage identity of a refresh token
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn token_key(hash: &str) -> String {
    format!("{}{}", TOKEN_KEY_PREFIX, hash)
}

fn user_key(user_id: i64) -> String {
    format!("{}{}", USER_KEY_PREFIX, user_id)
}

fn invalid() -> DomainError {
    DomainError::Auth(AuthError::InvalidOrExpiredRefreshToken)
}

/// Short prefix safe to log
fn hash_prefix(hash: &str) -> &str {
    &hash[..hash.len().min(8)]
}

/// Create, validate, rotate and revoke opaque refresh tokens
pub struct RefreshTokenStore {
    cache: Arc<dyn CacheStore>,
    repository: Arc<dyn RefreshTokenRepository>,
    lifetime: Duration,
}

impl RefreshTokenStore {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        repository: Arc<dyn RefreshTokenRepository>,
        lifetime: Duration,
    ) -> Self {
        Self {
            cache,
            repository,
            lifetime,
        }
    }

    /// Refresh token lifetime in seconds, for the cookie max-age
    pub fn expires_in(&self) -> i64 {
        self.lifetime.num_seconds()
    }

    /// Record a newly issued token
    ///
    /// The durable row is written first and any failure aborts. If the cache write
    /// then fails the row is revoked again so no token exists that was never
    /// handed out.
    pub async fn create(
        &self,
        user_id: i64,
        token: String,
        device_id: String,
        device_info: Option<String>,
        ip_address: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<RefreshTokenRecord> {
        let record = RefreshTokenRecord::new(
            token,
            user_id,
            device_id,
            device_info,
            ip_address,
            now,
            self.lifetime,
        );
        let hash = hash_token(&record.token);

        self.repository
            .save(StoredRefreshToken::from_record(&record, hash.clone()))
            .await?;

        if let Err(e) = self.write_cache(&hash, &record, now).await {
            warn!(user_id, token = hash_prefix(&hash), error = %e, "Refresh token cache write failed");
            if let Err(revoke_err) = self.repository.revoke(&hash).await {
                error!(
                    user_id,
                    token = hash_prefix(&hash),
                    error = %revoke_err,
                    "Failed to roll back durable refresh token"
                );
            }
            return Err(e);
        }

        debug!(user_id, device_id = %record.device_id, token = hash_prefix(&hash), "Refresh token created");
        Ok(record)
    }

    /// Load a token that is present, unrevoked and unexpired
    ///
    /// A cache miss falls back to the durable row and repairs the cache.
    pub async fn load_valid(&self, token: &str, now: DateTime<Utc>) -> DomainResult<RefreshTokenRecord> {
        let hash = hash_token(token);
        let mut record = self.load_by_hash(&hash, now).await?.ok_or_else(invalid)?;
        record.token = token.to_string();
        Ok(record)
    }

    /// Replace `old_token` with `new_token`
    ///
    /// Only the caller whose durable revoke flips the old row proceeds; a
    /// concurrent duplicate gets `InvalidOrExpiredRefreshToken`.
    pub async fn rotate(
        &self,
        old_token: &str,
        new_token: String,
        now: DateTime<Utc>,
    ) -> DomainResult<RefreshTokenRecord> {
        let old = self.load_valid(old_token, now).await?;
        let old_hash = hash_token(old_token);

        // Durable flag before eviction; cache repair re-checks it
        let won = self.repository.revoke(&old_hash).await?;
        self.evict(old.user_id, &old_hash).await?;

        if !won {
            warn!(
                user_id = old.user_id,
                token = hash_prefix(&old_hash),
                "Refresh token already consumed by a concurrent rotation"
            );
            return Err(invalid());
        }

        let record = self
            .create(
                old.user_id,
                new_token,
                old.device_id,
                old.device_info,
                old.ip_address,
                now,
            )
            .await?;

        info!(user_id = record.user_id, device_id = %record.device_id, "Refresh token rotated");
        Ok(record)
    }

    /// Revoke a token wherever it lives
    ///
    /// Absent or already revoked tokens are not an error; the result says whether
    /// this call revoked anything.
    pub async fn revoke(&self, token: &str) -> DomainResult<bool> {
        let hash = hash_token(token);

        let Some(stored) = self.repository.find_by_token(&hash).await? else {
            self.cache.delete(&token_key(&hash)).await?;
            return Ok(false);
        };

        let revoked = self.repository.revoke(&hash).await?;
        self.evict(stored.user_id, &hash).await?;

        if revoked {
            info!(user_id = stored.user_id, device_id = %stored.device_id, "Refresh token revoked");
        }
        Ok(revoked)
    }

    /// Revoke every session of a user
    ///
    /// # Returns
    /// Number of durable rows revoked
    pub async fn revoke_all_for_user(&self, user_id: i64, now: DateTime<Utc>) -> DomainResult<usize> {
        let set_key = user_key(user_id);

        let mut hashes: BTreeSet<String> = self.cache.set_members(&set_key).await?.into_iter().collect();
        hashes.extend(
            self.repository
                .find_active_by_user(user_id, now)
                .await?
                .into_iter()
                .map(|t| t.token_value),
        );

        for hash in &hashes {
            self.cache.delete(&token_key(hash)).await?;
        }
        self.cache.delete(&set_key).await?;

        let revoked = self.repository.revoke_all_for_user(user_id).await?;
        info!(user_id, revoked, "Revoked all refresh tokens for user");
        Ok(revoked)
    }

    /// Active sessions of a user, newest first
    ///
    /// Set members whose session is gone are pruned from the index as a side effect.
    pub async fn list_sessions(&self, user_id: i64, now: DateTime<Utc>) -> DomainResult<Vec<RefreshTokenRecord>> {
        let set_key = user_key(user_id);
        let mut sessions = Vec::new();

        for hash in self.cache.set_members(&set_key).await? {
            match self.load_by_hash(&hash, now).await? {
                Some(record) if record.user_id == user_id => sessions.push(record),
                _ => {
                    debug!(user_id, token = hash_prefix(&hash), "Pruning stale session index entry");
                    self.cache.set_remove(&set_key, &hash).await?;
                }
            }
        }

        sessions.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));
        Ok(sessions)
    }

    /// Delete durable rows that have expired
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        self.repository.delete_expired(now).await
    }

    async fn load_by_hash(&self, hash: &str, now: DateTime<Utc>) -> DomainResult<Option<RefreshTokenRecord>> {
        let key = token_key(hash);

        match self.cache.get(&key).await {
            Ok(Some(json)) => match serde_json::from_str::<RefreshTokenRecord>(&json) {
                Ok(record) if record.is_expired_at(now) => {
                    self.discard_cache_entry(&key).await;
                    return Ok(None);
                }
                Ok(record) => return Ok(Some(record)),
                Err(e) => {
                    warn!(token = hash_prefix(hash), error = %e, "Discarding unreadable refresh token cache entry");
                    self.discard_cache_entry(&key).await;
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(token = hash_prefix(hash), error = %e, "Refresh token cache read failed, using durable store");
            }
        }

        let Some(stored) = self.repository.find_by_token(hash).await? else {
            return Ok(None);
        };
        if stored.revoked {
            return Ok(None);
        }
        if stored.is_expired_at(now) {
            self.discard_cache_entry(&key).await;
            return Ok(None);
        }

        let record = RefreshTokenRecord::from_stored(String::new(), &stored);
        if let Err(e) = self.write_cache(hash, &record, now).await {
            warn!(token = hash_prefix(hash), error = %e, "Failed to rehydrate refresh token cache");
            return Ok(Some(record));
        }

        // A revoke may have landed between the read above and the cache write
        let still_live = matches!(
            self.repository.find_by_token(hash).await?,
            Some(row) if !row.revoked
        );
        if !still_live {
            debug!(user_id = record.user_id, token = hash_prefix(hash), "Token revoked during cache repair");
            self.evict(record.user_id, hash).await?;
            return Ok(None);
        }

        debug!(user_id = record.user_id, token = hash_prefix(hash), "Rehydrated refresh token cache");
        Ok(Some(record))
    }

    /// Drop a token's cache entry and its session index membership
    async fn evict(&self, user_id: i64, hash: &str) -> DomainResult<()> {
        self.cache.delete(&token_key(hash)).await?;
        self.cache.set_remove(&user_key(user_id), hash).await
    }

    async fn write_cache(&self, hash: &str, record: &RefreshTokenRecord, now: DateTime<Utc>) -> DomainResult<()> {
        let ttl = record.remaining(now).num_seconds();
        if ttl > 0 {
            let json = serde_json::to_string(record).map_err(|e| DomainError::Internal {
                message: format!("Failed to serialize refresh token record: {}", e),
            })?;
            self.cache.set_with_expiry(&token_key(hash), &json, ttl as u64).await?;
        } else {
            warn!(user_id = record.user_id, ttl, "Skipping refresh token cache write with non-positive TTL");
        }

        self.cache.set_add(&user_key(record.user_id), hash).await
    }

    async fn discard_cache_entry(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            warn!(error = %e, "Failed to delete stale refresh token cache entry");
        }
    }
}
