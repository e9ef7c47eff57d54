//! Authentication configuration: signing keys, token lifetimes, refresh cookie

use serde::{Deserialize, Serialize};

use super::env_parse;

/// JWT signing and token lifetime configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Path to the PEM-encoded RSA private key used for signing
    pub private_key_path: String,

    /// Path to the PEM-encoded RSA public key used for verification
    pub public_key_path: String,

    /// Key identifier embedded in the `kid` header of issued tokens
    pub key_id: String,

    /// Retired public keys still accepted for verification, as `(kid, path)`
    #[serde(default)]
    pub retired_keys: Vec<(String, String)>,

    /// JWT issuer claim
    pub issuer: String,

    /// Access token lifetime in seconds
    pub access_token_expiry: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            private_key_path: String::from("keys/jwt_private_key.pem"),
            public_key_path: String::from("keys/jwt_public_key.pem"),
            key_id: String::from("reporthub-key-1"),
            retired_keys: Vec::new(),
            issuer: String::from("reporthub"),
            access_token_expiry: 1800,      // 30 minutes
            refresh_token_expiry: 1_209_600, // 14 days
        }
    }
}

impl JwtConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            private_key_path: std::env::var("JWT_PRIVATE_KEY_PATH")
                .unwrap_or(defaults.private_key_path),
            public_key_path: std::env::var("JWT_PUBLIC_KEY_PATH")
                .unwrap_or(defaults.public_key_path),
            key_id: std::env::var("JWT_KEY_ID").unwrap_or(defaults.key_id),
            retired_keys: std::env::var("JWT_RETIRED_KEYS")
                .map(|raw| parse_retired_keys(&raw))
                .unwrap_or_default(),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            access_token_expiry: env_parse("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_parse("JWT_REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiry),
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }
}

/// Attributes of the HTTP-only cookie carrying the refresh token
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshCookieConfig {
    /// Cookie name
    pub name: String,

    /// Cookie path; limits the cookie to the auth endpoints
    pub path: String,

    /// Secure flag (HTTPS only)
    pub secure: bool,

    /// SameSite attribute ("Strict", "Lax" or "None")
    pub same_site: String,

    /// HttpOnly flag
    #[serde(default = "default_http_only")]
    pub http_only: bool,
}

impl Default for RefreshCookieConfig {
    fn default() -> Self {
        Self {
            name: String::from("refresh_token"),
            path: String::from("/api/v1/auth"),
            secure: true,
            same_site: String::from("Strict"),
            http_only: default_http_only(),
        }
    }
}

impl RefreshCookieConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            name: std::env::var("REFRESH_COOKIE_NAME").unwrap_or(defaults.name),
            path: std::env::var("REFRESH_COOKIE_PATH").unwrap_or(defaults.path),
            secure: env_parse("REFRESH_COOKIE_SECURE", defaults.secure),
            same_site: std::env::var("REFRESH_COOKIE_SAME_SITE").unwrap_or(defaults.same_site),
            http_only: true,
        }
    }
}

/// Settings for the periodic sweep of stale durable refresh tokens
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenCleanupSettings {
    /// Whether the background sweep runs at all
    pub enabled: bool,

    /// Seconds between sweeps
    pub interval_seconds: u64,
}

impl Default for TokenCleanupSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 3600,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Refresh cookie configuration
    #[serde(default)]
    pub cookie: RefreshCookieConfig,

    /// Days after which a password is considered past its rotation window
    #[serde(default = "default_password_rotation_days")]
    pub password_rotation_days: i64,

    /// Durable token sweep settings
    #[serde(default)]
    pub cleanup: TokenCleanupSettings,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            cookie: RefreshCookieConfig::default(),
            password_rotation_days: default_password_rotation_days(),
            cleanup: TokenCleanupSettings::default(),
        }
    }
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let cleanup_defaults = TokenCleanupSettings::default();
        Self {
            jwt: JwtConfig::from_env(),
            cookie: RefreshCookieConfig::from_env(),
            password_rotation_days: env_parse(
                "PASSWORD_ROTATION_DAYS",
                default_password_rotation_days(),
            ),
            cleanup: TokenCleanupSettings {
                enabled: env_parse("TOKEN_CLEANUP_ENABLED", cleanup_defaults.enabled),
                interval_seconds: env_parse(
                    "TOKEN_CLEANUP_INTERVAL_SECONDS",
                    cleanup_defaults.interval_seconds,
                ),
            },
        }
    }

    /// Access token lifetime in seconds
    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.jwt.access_token_expiry
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_token_expiry_seconds(&self) -> i64 {
        self.jwt.refresh_token_expiry
    }
}

/// Parses `kid=path,kid=path` into pairs, skipping malformed entries
fn parse_retired_keys(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|entry| {
            let (kid, path) = entry.trim().split_once('=')?;
            let (kid, path) = (kid.trim(), path.trim());
            if kid.is_empty() || path.is_empty() {
                return None;
            }
            Some((kid.to_string(), path.to_string()))
        })
        .collect()
}

fn default_http_only() -> bool {
    true
}

fn default_password_rotation_days() -> i64 {
    90
}
