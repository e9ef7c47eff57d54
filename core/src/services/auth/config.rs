//! Configuration for the authentication service

use rh_shared::config::AuthConfig;

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// Days after which a password counts as expired; 0 disables the check
    pub password_rotation_days: i64,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            password_rotation_days: 90,
        }
    }
}

impl From<&AuthConfig> for AuthServiceConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            password_rotation_days: config.password_rotation_days,
        }
    }
}
