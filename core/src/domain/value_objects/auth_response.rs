//! Results of the authentication flow.

use serde::{Deserialize, Serialize};

use crate::domain::entities::user::{Principal, Role};

/// Public summary of the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl From<&Principal> for UserSummary {
    fn from(principal: &Principal) -> Self {
        Self {
            email: principal.email.clone(),
            display_name: principal.display_name.clone(),
            role: principal.primary_role(),
        }
    }
}

/// Credentials produced by a successful login or refresh
///
/// The refresh token is meant for the cookie only; the HTTP layer must not put it
/// in a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    /// Signed access token
    pub access_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Opaque refresh token
    pub refresh_token: String,

    /// Refresh token lifetime in seconds, for the cookie max-age
    pub refresh_expires_in: i64,

    /// Device the refresh session is bound to
    pub device_id: String,

    /// Whether the password is past its rotation window
    pub password_expired: bool,

    pub user: UserSummary,
}

/// What a logout actually managed to revoke
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogoutOutcome {
    pub refresh_revoked: bool,
    pub access_blacklisted: bool,
}
