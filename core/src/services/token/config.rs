//! Configuration for the token services

use chrono::Duration;
use rh_shared::config::JwtConfig;

/// Lifetimes and issuer shared by issuance and validation
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// `iss` claim written and expected
    pub issuer: String,
    /// Access token lifetime in seconds
    pub access_token_expiry_seconds: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_expiry_seconds: i64,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            issuer: "reporthub".to_string(),
            access_token_expiry_seconds: 1800,
            refresh_token_expiry_seconds: 14 * 24 * 60 * 60,
        }
    }
}

impl TokenServiceConfig {
    pub fn from_jwt_config(jwt: &JwtConfig) -> Self {
        Self {
            issuer: jwt.issuer.clone(),
            access_token_expiry_seconds: jwt.access_token_expiry,
            refresh_token_expiry_seconds: jwt.refresh_token_expiry,
        }
    }

    pub fn access_token_lifetime(&self) -> Duration {
        Duration::seconds(self.access_token_expiry_seconds)
    }

    pub fn refresh_token_lifetime(&self) -> Duration {
        Duration::seconds(self.refresh_token_expiry_seconds)
    }
}
