//! Storage interfaces the token lifecycle depends on.
//!
//! The cache is the fast path and the durable repository is the system of record.
//! Concrete Redis and MySQL implementations live in the infrastructure crate.

pub mod cache;
pub mod token;

pub use cache::CacheStore;
pub use token::RefreshTokenRepository;

#[cfg(any(test, feature = "test-utils"))]
pub use cache::InMemoryCache;
#[cfg(any(test, feature = "test-utils"))]
pub use token::InMemoryRefreshTokenRepository;
