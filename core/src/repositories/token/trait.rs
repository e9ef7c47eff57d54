//! Durable refresh token store.
//!
//! This is the system of record for refresh sessions. Tokens are looked up by the
//! SHA-256 hex digest of the opaque value, never by the raw value.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::token::StoredRefreshToken;
use crate::errors::DomainError;

/// Repository trait for refresh token persistence
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a newly issued token
    ///
    /// # Returns
    /// * `Ok(StoredRefreshToken)` - The saved row
    /// * `Err(DomainError)` - Save failed (e.g., duplicate token hash)
    async fn save(&self, token: StoredRefreshToken) -> Result<StoredRefreshToken, DomainError>;

    /// Find a token row by hash, revoked or not
    async fn find_by_token(&self, token_hash: &str)
        -> Result<Option<StoredRefreshToken>, DomainError>;

    /// Mark a token revoked if it is not already
    ///
    /// # Returns
    /// * `Ok(true)` - This call flipped the flag
    /// * `Ok(false)` - Token absent or already revoked
    async fn revoke(&self, token_hash: &str) -> Result<bool, DomainError>;

    /// Unrevoked, unexpired tokens for a user, newest first
    async fn find_active_by_user(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<StoredRefreshToken>, DomainError>;

    /// Revoke every unrevoked token of a user
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of tokens revoked
    async fn revoke_all_for_user(&self, user_id: i64) -> Result<usize, DomainError>;

    /// Delete rows that expired at or before `now`
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows deleted
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;
}
