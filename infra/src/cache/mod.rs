//! Cache module for Redis-based caching
//!
//! Redis holds the fast-path copy of refresh sessions, the per-user session
//! index sets and the access token blacklist.

pub mod redis_client;

#[cfg(test)]
mod tests;

pub use redis_client::RedisClient;

// Re-export commonly used types
pub use rh_shared::config::CacheConfig;
