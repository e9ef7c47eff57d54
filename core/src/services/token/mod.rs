//! Token lifecycle services
//!
//! This module handles all token-related operations including:
//! - RS256 signing keys with key-id aware verification
//! - Access token issuance and validation
//! - Opaque refresh tokens with rotation
//! - Access token revocation (blacklist and logout-all cutoffs)
//! - Background cleanup of expired refresh tokens

mod blacklist;
mod cleanup;
mod config;
mod issuer;
mod key_manager;
mod refresh_store;
mod validation;

#[cfg(test)]
mod tests;

pub use blacklist::AccessTokenBlacklist;
pub use cleanup::{TokenCleanupConfig, TokenCleanupService};
pub use config::TokenServiceConfig;
pub use issuer::{create_refresh_token, AccessTokenIssuer, REFRESH_TOKEN_BYTES};
pub use key_manager::Rs256KeyManager;
pub use refresh_store::{hash_token, RefreshTokenStore};
pub use validation::{BlacklistValidator, ClaimsValidator, LogoutAllValidator, TokenValidationPolicy};
