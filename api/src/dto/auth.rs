use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use rh_core::domain::entities::RefreshTokenRecord;
use rh_core::domain::value_objects::UserSummary;
use rh_core::AuthResponse;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,

    /// Client-chosen device identifier; blank means "default"
    #[serde(default, rename = "deviceId")]
    #[validate(length(max = 128))]
    pub device_id: Option<String>,

    /// Free-text device description; falls back to the User-Agent header
    #[serde(default, rename = "deviceInfo")]
    #[validate(length(max = 512))]
    pub device_info: Option<String>,
}

/// Body returned by login and refresh
///
/// The refresh token travels only in the cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token_type: String,
    pub access_token: String,
    pub expires_in: i64,
    pub password_expired: bool,
    pub user: UserSummary,
}

impl From<&AuthResponse> for TokenResponse {
    fn from(response: &AuthResponse) -> Self {
        Self {
            token_type: "Bearer".to_string(),
            access_token: response.access_token.clone(),
            expires_in: response.expires_in,
            password_expired: response.password_expired,
            user: response.user.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
    pub refresh_revoked: bool,
    pub access_blacklisted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutAllResponse {
    pub message: String,
    pub revoked_sessions: usize,
}

/// One active refresh session, without the token itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub device_id: String,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

impl From<&RefreshTokenRecord> for SessionResponse {
    fn from(record: &RefreshTokenRecord) -> Self {
        Self {
            device_id: record.device_id.clone(),
            device_info: record.device_info.clone(),
            ip_address: record.ip_address.clone(),
            issued_at: record.issued_at,
            expires_at: record.expires_at,
            last_used_at: record.last_used_at,
        }
    }
}
