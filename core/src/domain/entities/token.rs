//! Token entities for access and refresh credentials.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::Role;

/// Device id recorded when the client does not send one
pub const DEFAULT_DEVICE_ID: &str = "default";

/// Map an empty or blank device id onto [`DEFAULT_DEVICE_ID`]
pub fn normalize_device_id(device_id: Option<&str>) -> String {
    match device_id.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => DEFAULT_DEVICE_ID.to_string(),
    }
}

/// Claims carried by a signed access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user UUID)
    pub sub: String,

    /// Numeric user id
    #[serde(rename = "userId")]
    pub user_id: i64,

    pub email: String,

    pub roles: Vec<Role>,

    #[serde(rename = "deviceId")]
    pub device_id: String,

    /// Unique token id, used as the blacklist key
    pub jti: String,

    /// Issuer
    pub iss: String,

    /// Issued at (seconds since epoch)
    pub iat: i64,

    /// Issued at (milliseconds since epoch)
    pub iat_ms: i64,

    /// Expiration (seconds since epoch)
    pub exp: i64,
}

impl AccessClaims {
    /// Issue instant at millisecond resolution
    pub fn issued_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.iat_ms)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Gets the user UUID from the subject
    pub fn subject_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// A live refresh session, as held in the cache
///
/// The raw `token` is never serialized; the cache entry is keyed by its hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    #[serde(skip)]
    pub token: String,

    pub user_id: i64,

    pub device_id: String,

    pub device_info: Option<String>,

    pub ip_address: Option<String>,

    pub issued_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,

    pub last_used_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn new(
        token: String,
        user_id: i64,
        device_id: String,
        device_info: Option<String>,
        ip_address: Option<String>,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            token,
            user_id,
            device_id,
            device_info,
            ip_address,
            issued_at: now,
            expires_at: now + lifetime,
            last_used_at: now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Time left before expiry, or zero once expired
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }

    /// Rebuild a cache record from its durable row
    pub fn from_stored(token: String, stored: &StoredRefreshToken) -> Self {
        Self {
            token,
            user_id: stored.user_id,
            device_id: stored.device_id.clone(),
            device_info: stored.device_info.clone(),
            ip_address: stored.ip_address.clone(),
            issued_at: stored.created_at,
            expires_at: stored.expires_at,
            last_used_at: stored.created_at,
        }
    }
}

/// Refresh token row in the durable store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRefreshToken {
    pub id: Uuid,

    pub user_id: i64,

    /// SHA-256 hex digest of the opaque token
    pub token_value: String,

    pub device_id: String,

    pub device_info: Option<String>,

    pub ip_address: Option<String>,

    pub created_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,

    pub revoked: bool,
}

impl StoredRefreshToken {
    pub fn from_record(record: &RefreshTokenRecord, token_value: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            token_value,
            device_id: record.device_id.clone(),
            device_info: record.device_info.clone(),
            ip_address: record.ip_address.clone(),
            created_at: record.issued_at,
            expires_at: record.expires_at,
            revoked: false,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Not revoked and not expired
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired_at(now)
    }
}
