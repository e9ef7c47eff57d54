//! Main authentication service implementation

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::domain::entities::token::{normalize_device_id, AccessClaims, RefreshTokenRecord};
use crate::domain::entities::user::Principal;
use crate::domain::value_objects::{AuthResponse, LogoutOutcome, UserSummary};
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::services::token::{
    create_refresh_token, AccessTokenBlacklist, AccessTokenIssuer, RefreshTokenStore,
};

use super::config::AuthServiceConfig;
use super::traits::{CredentialAuthenticator, UserDirectory};

/// Authentication service for the complete token lifecycle
pub struct AuthService {
    /// Verifies email and password
    authenticator: Arc<dyn CredentialAuthenticator>,
    /// Reloads users on refresh
    users: Arc<dyn UserDirectory>,
    issuer: Arc<AccessTokenIssuer>,
    refresh_store: Arc<RefreshTokenStore>,
    blacklist: Arc<AccessTokenBlacklist>,
    clock: Arc<dyn Clock>,
    config: AuthServiceConfig,
}

impl AuthService {
    pub fn new(
        authenticator: Arc<dyn CredentialAuthenticator>,
        users: Arc<dyn UserDirectory>,
        issuer: Arc<AccessTokenIssuer>,
        refresh_store: Arc<RefreshTokenStore>,
        blacklist: Arc<AccessTokenBlacklist>,
        clock: Arc<dyn Clock>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            authenticator,
            users,
            issuer,
            refresh_store,
            blacklist,
            clock,
            config,
        }
    }

    /// Authenticate with email and password and open a refresh session
    ///
    /// A missing or blank `device_id` is recorded as `"default"`.
    ///
    /// # Returns
    ///
    /// * `Ok(AuthResponse)` - Access token, refresh token and user summary
    /// * `Err(DomainError)` - `InvalidCredentials`, `AccountDisabled`, or a storage
    ///   failure while recording the session
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        device_id: Option<&str>,
        device_info: Option<String>,
        ip_address: Option<String>,
    ) -> DomainResult<AuthResponse> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::Auth(AuthError::InvalidCredentials));
        }

        let principal = self.authenticator.authenticate(email, password).await.map_err(|e| {
            info!(error = %e, "Login rejected");
            e
        })?;

        if !principal.is_active() {
            warn!(user_id = principal.user_id, status = ?principal.status, "Login attempt on inactive account");
            return Err(DomainError::Auth(AuthError::AccountDisabled));
        }

        let device_id = normalize_device_id(device_id);
        let now = self.clock.now();

        let access_token = self.issuer.issue(&principal, &device_id, now)?;
        let record = self
            .refresh_store
            .create(
                principal.user_id,
                create_refresh_token(),
                device_id,
                device_info,
                ip_address,
                now,
            )
            .await?;

        info!(user_id = principal.user_id, device_id = %record.device_id, "User logged in");
        Ok(self.build_response(access_token, record, &principal, now))
    }

    /// Exchange a refresh token for a new access token and a rotated refresh token
    ///
    /// The user is reloaded so role and status changes since login take effect.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<AuthResponse> {
        if refresh_token.trim().is_empty() {
            return Err(DomainError::Auth(AuthError::InvalidOrExpiredRefreshToken));
        }

        let now = self.clock.now();
        let current = self.refresh_store.load_valid(refresh_token, now).await?;

        if let Some(cutoff) = self.blacklist.get_logout_all_at(current.user_id).await? {
            if current.issued_at.timestamp_millis() < cutoff.timestamp_millis() {
                warn!(user_id = current.user_id, "Refresh token issued before logout-all");
                self.discard_refresh_token(refresh_token).await;
                return Err(DomainError::Auth(AuthError::InvalidOrExpiredRefreshToken));
            }
        }

        let rotated = self
            .refresh_store
            .rotate(refresh_token, create_refresh_token(), now)
            .await?;

        let principal = match self.active_principal(rotated.user_id).await {
            Ok(principal) => principal,
            Err(e) => {
                self.discard_refresh_token(&rotated.token).await;
                return Err(e);
            }
        };

        let access_token = match self.issuer.issue(&principal, &rotated.device_id, now) {
            Ok(token) => token,
            Err(e) => {
                self.discard_refresh_token(&rotated.token).await;
                return Err(e);
            }
        };

        info!(user_id = principal.user_id, device_id = %rotated.device_id, "Tokens refreshed");
        Ok(self.build_response(access_token, rotated, &principal, now))
    }

    /// End one session
    ///
    /// Revoking the refresh token and blacklisting the access token are independent;
    /// failure or absence of one never prevents the other.
    pub async fn logout(
        &self,
        refresh_token: Option<&str>,
        access_claims: Option<&AccessClaims>,
    ) -> LogoutOutcome {
        let now = self.clock.now();
        let mut outcome = LogoutOutcome::default();

        if let Some(token) = refresh_token.filter(|t| !t.trim().is_empty()) {
            match self.refresh_store.revoke(token).await {
                Ok(revoked) => outcome.refresh_revoked = revoked,
                Err(e) => warn!(error = %e, "Failed to revoke refresh token on logout"),
            }
        }

        if let Some(claims) = access_claims {
            match self.blacklist.blacklist(&claims.jti, claims.expires_at(), now).await {
                Ok(written) => outcome.access_blacklisted = written,
                Err(e) => warn!(jti = %claims.jti, error = %e, "Failed to blacklist access token on logout"),
            }
        }

        info!(
            user_id = ?access_claims.map(|c| c.user_id),
            refresh_revoked = outcome.refresh_revoked,
            access_blacklisted = outcome.access_blacklisted,
            "User logged out"
        );
        outcome
    }

    /// Invalidate every access and refresh token of a user
    ///
    /// # Returns
    /// Number of refresh tokens revoked
    pub async fn logout_all(&self, user_id: i64) -> DomainResult<usize> {
        let now = self.clock.now();

        self.blacklist.mark_logout_all(user_id, now).await?;
        let revoked = self.refresh_store.revoke_all_for_user(user_id, now).await?;

        info!(user_id, revoked, "User logged out everywhere");
        Ok(revoked)
    }

    /// Active refresh sessions of a user, newest first
    pub async fn sessions(&self, user_id: i64) -> DomainResult<Vec<RefreshTokenRecord>> {
        self.refresh_store.list_sessions(user_id, self.clock.now()).await
    }

    async fn active_principal(&self, user_id: i64) -> DomainResult<Principal> {
        let principal = self
            .users
            .load_by_id(user_id)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidOrExpiredRefreshToken))?;

        if !principal.is_active() {
            warn!(user_id, status = ?principal.status, "Refresh rejected for inactive account");
            return Err(DomainError::Auth(AuthError::AccountDisabled));
        }
        Ok(principal)
    }

    async fn discard_refresh_token(&self, token: &str) {
        if let Err(e) = self.refresh_store.revoke(token).await {
            warn!(error = %e, "Failed to revoke unusable refresh token");
        }
    }

    fn build_response(
        &self,
        access_token: String,
        record: RefreshTokenRecord,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> AuthResponse {
        AuthResponse {
            access_token,
            expires_in: self.issuer.expires_in(),
            refresh_token: record.token,
            refresh_expires_in: self.refresh_store.expires_in(),
            device_id: record.device_id,
            password_expired: principal
                .is_password_expired(now, self.config.password_rotation_days),
            user: UserSummary::from(principal),
        }
    }
}
