//! Business services containing domain logic and use cases.

pub mod auth;
pub mod token;

// Re-export commonly used types
pub use auth::{AuthService, AuthServiceConfig, CredentialAuthenticator, UserDirectory};
pub use token::{
    AccessTokenBlacklist, AccessTokenIssuer, RefreshTokenStore, Rs256KeyManager,
    TokenCleanupService, TokenServiceConfig, TokenValidationPolicy,
};
