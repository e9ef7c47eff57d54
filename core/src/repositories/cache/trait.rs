//! Key-value cache interface used for refresh sessions and the access-token blacklist.

use async_trait::async_trait;

use crate::errors::DomainError;

/// Minimal cache contract
///
/// Each call is expected to be atomic on its own key at the storage layer.
/// Nothing here composes atomically across keys.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a string value
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Write a string value that expires after `ttl_secs`
    async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64)
        -> Result<(), DomainError>;

    /// Delete a key of any type
    ///
    /// Returns `true` only for the caller that actually removed it.
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    async fn exists(&self, key: &str) -> Result<bool, DomainError>;

    /// Add a member to the set stored at `key`
    async fn set_add(&self, key: &str, member: &str) -> Result<(), DomainError>;

    /// Remove a member from the set stored at `key`
    async fn set_remove(&self, key: &str, member: &str) -> Result<(), DomainError>;

    /// All members of the set stored at `key`, empty when absent
    async fn set_members(&self, key: &str) -> Result<Vec<String>, DomainError>;
}
