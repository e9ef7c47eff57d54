//! Database module - MySQL implementations using SQLx
//!
//! - Connection pool management
//! - Refresh token persistence
//! - User credential and role lookups

pub mod connection;
pub mod mysql;


pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{MySqlRefreshTokenRepository, MySqlUserDirectory};
