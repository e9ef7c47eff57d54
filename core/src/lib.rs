//! # ReportHub Core
//!
//! Authentication and token lifecycle for the ReportHub report portal.
//! This crate contains the domain entities, the token and authentication services,
//! the storage interfaces they depend on, and the error taxonomy shared with the
//! HTTP layer.

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use clock::{Clock, SystemClock};
pub use domain::{
    AccessClaims, AccountStatus, AuthResponse, LogoutOutcome, Principal, RefreshTokenRecord,
    Role, StoredRefreshToken, UserSummary,
};
pub use errors::{AuthError, DomainError, DomainResult, TokenError};
pub use repositories::{CacheStore, RefreshTokenRepository};
pub use services::{
    AccessTokenBlacklist, AccessTokenIssuer, AuthService, AuthServiceConfig,
    CredentialAuthenticator, RefreshTokenStore, Rs256KeyManager, TokenCleanupService,
    TokenServiceConfig, TokenValidationPolicy, UserDirectory,
};
