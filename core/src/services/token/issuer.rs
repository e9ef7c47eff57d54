//! Access token issuance and opaque refresh token generation

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, Header};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::error;
use uuid::Uuid;

use crate::domain::entities::token::AccessClaims;
use crate::domain::entities::user::Principal;
use crate::errors::{DomainError, TokenError};

use super::config::TokenServiceConfig;
use super::key_manager::Rs256KeyManager;

/// Entropy of a refresh token
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// New opaque refresh token: 32 random bytes, URL-safe base64 without padding
pub fn create_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Builds and signs access tokens
///
/// Callers are responsible for refusing inactive principals.
pub struct AccessTokenIssuer {
    keys: Arc<Rs256KeyManager>,
    config: TokenServiceConfig,
}

impl AccessTokenIssuer {
    pub fn new(keys: Arc<Rs256KeyManager>, config: TokenServiceConfig) -> Self {
        Self { keys, config }
    }

    /// Access token lifetime in seconds, as reported to clients
    pub fn expires_in(&self) -> i64 {
        self.config.access_token_expiry_seconds
    }

    pub fn claims_for(&self, principal: &Principal, device_id: &str, now: DateTime<Utc>) -> AccessClaims {
        let exp = now + self.config.access_token_lifetime();
        AccessClaims {
            sub: principal.id.to_string(),
            user_id: principal.user_id,
            email: principal.email.clone(),
            roles: principal.roles.clone(),
            device_id: device_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            iat_ms: now.timestamp_millis(),
            exp: exp.timestamp(),
        }
    }

    /// Sign claims for `principal` bound to `device_id`
    pub fn issue(
        &self,
        principal: &Principal,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> Result<String, DomainError> {
        let claims = self.claims_for(principal, device_id, now);
        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &AccessClaims) -> Result<String, DomainError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.keys.key_id().to_string());

        encode(&header, claims, self.keys.encoding_key()).map_err(|e| {
            error!(user_id = claims.user_id, error = %e, "Failed to sign access token");
            DomainError::Token(TokenError::TokenGenerationFailed)
        })
    }
}
