//! Access token validation: signature, issuer and expiry, then revocation checks

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::domain::entities::token::AccessClaims;
use crate::errors::{DomainError, DomainResult, TokenError};

use super::blacklist::AccessTokenBlacklist;
use super::config::TokenServiceConfig;
use super::key_manager::Rs256KeyManager;

fn token_invalid() -> DomainError {
    DomainError::Token(TokenError::TokenInvalid)
}

/// One check over already-verified claims
#[async_trait]
pub trait ClaimsValidator: Send + Sync {
    async fn validate(&self, claims: &AccessClaims) -> DomainResult<()>;
}

/// Rejects tokens whose `jti` has been blacklisted
pub struct BlacklistValidator {
    blacklist: Arc<AccessTokenBlacklist>,
}

impl BlacklistValidator {
    pub fn new(blacklist: Arc<AccessTokenBlacklist>) -> Self {
        Self { blacklist }
    }
}

#[async_trait]
impl ClaimsValidator for BlacklistValidator {
    async fn validate(&self, claims: &AccessClaims) -> DomainResult<()> {
        match self.blacklist.is_blacklisted(&claims.jti).await {
            Ok(false) => Ok(()),
            Ok(true) => {
                debug!(jti = %claims.jti, "Rejected blacklisted access token");
                Err(token_invalid())
            }
            Err(e) => {
                warn!(jti = %claims.jti, error = %e, "Blacklist lookup failed, rejecting token");
                Err(token_invalid())
            }
        }
    }
}

/// Rejects tokens issued strictly before the user's logout-all cutoff
pub struct LogoutAllValidator {
    blacklist: Arc<AccessTokenBlacklist>,
}

impl LogoutAllValidator {
    pub fn new(blacklist: Arc<AccessTokenBlacklist>) -> Self {
        Self { blacklist }
    }
}

#[async_trait]
impl ClaimsValidator for LogoutAllValidator {
    async fn validate(&self, claims: &AccessClaims) -> DomainResult<()> {
        match self.blacklist.get_logout_all_at(claims.user_id).await {
            Ok(Some(cutoff)) if claims.iat_ms < cutoff.timestamp_millis() => {
                debug!(user_id = claims.user_id, jti = %claims.jti, "Rejected access token issued before logout-all");
                Err(token_invalid())
            }
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(user_id = claims.user_id, error = %e, "Logout-all lookup failed, rejecting token");
                Err(token_invalid())
            }
        }
    }
}

/// Verifies access tokens for every authenticated request
pub struct TokenValidationPolicy {
    keys: Arc<Rs256KeyManager>,
    issuer: String,
    clock: Arc<dyn Clock>,
    validators: Vec<Arc<dyn ClaimsValidator>>,
}

impl TokenValidationPolicy {
    /// Signature, issuer and expiry checks only
    pub fn new(keys: Arc<Rs256KeyManager>, config: &TokenServiceConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            keys,
            issuer: config.issuer.clone(),
            clock,
            validators: Vec::new(),
        }
    }

    /// Standard chain: blacklist, then logout-all cutoff
    pub fn with_blacklist(
        keys: Arc<Rs256KeyManager>,
        config: &TokenServiceConfig,
        blacklist: Arc<AccessTokenBlacklist>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(keys, config, clock)
            .with_validator(Arc::new(BlacklistValidator::new(blacklist.clone())))
            .with_validator(Arc::new(LogoutAllValidator::new(blacklist)))
    }

    /// Append a check; checks run in insertion order and stop at the first failure
    pub fn with_validator(mut self, validator: Arc<dyn ClaimsValidator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Decode and fully validate a bearer token
    pub async fn validate(&self, token: &str) -> DomainResult<AccessClaims> {
        let claims = self.decode(token)?;
        self.validate_claims(&claims).await?;
        Ok(claims)
    }

    /// Run the revocation chain over claims that were already decoded
    pub async fn validate_claims(&self, claims: &AccessClaims) -> DomainResult<()> {
        for validator in &self.validators {
            validator.validate(claims).await?;
        }
        Ok(())
    }

    /// Verify signature, issuer and expiry without consulting revocation state
    pub fn decode(&self, token: &str) -> DomainResult<AccessClaims> {
        let header = decode_header(token)
            .map_err(|_| DomainError::Token(TokenError::InvalidTokenFormat))?;

        let key = self
            .keys
            .decoding_key_for(header.kid.as_deref())
            .ok_or_else(|| {
                debug!(kid = ?header.kid, "Access token signed with unknown key id");
                DomainError::Token(TokenError::InvalidSignature)
            })?;

        // Expiry is checked against the injected clock below
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let data = decode::<AccessClaims>(token, key, &validation).map_err(|e| {
            DomainError::Token(match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::InvalidRsaKey(_) => {
                    TokenError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                ErrorKind::InvalidIssuer => TokenError::TokenInvalid,
                _ => TokenError::InvalidTokenFormat,
            })
        })?;

        if data.claims.is_expired_at(self.clock.now()) {
            return Err(DomainError::Token(TokenError::TokenExpired));
        }

        Ok(data.claims)
    }
}
