//! Principal returned by the credential authenticator and the user directory.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authorization role, closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ROLE_USER" | "USER" => Ok(Role::User),
            "ROLE_ADMIN" | "ADMIN" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Account state as far as authentication is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    /// Registered but email not yet verified
    Unverified,
    Disabled,
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(AccountStatus::Active),
            "unverified" | "pending" => Ok(AccountStatus::Unverified),
            "disabled" | "blocked" | "locked" => Ok(AccountStatus::Disabled),
            other => Err(format!("Unknown account status: {}", other)),
        }
    }
}

/// Authenticated user with roles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Public identifier, used as the token subject
    pub id: Uuid,

    /// Internal numeric id
    pub user_id: i64,

    pub email: String,

    pub display_name: String,

    pub roles: Vec<Role>,

    pub status: AccountStatus,

    /// Last password change; `None` when never recorded
    pub password_changed_at: Option<DateTime<Utc>>,
}

impl Principal {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Highest role held, used for the user summary
    pub fn primary_role(&self) -> Role {
        if self.roles.contains(&Role::Admin) {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// Whether the password is older than `rotation_days`
    ///
    /// A password with no recorded change date is treated as expired.
    pub fn is_password_expired(&self, now: DateTime<Utc>, rotation_days: i64) -> bool {
        if rotation_days <= 0 {
            return false;
        }
        match self.password_changed_at {
            Some(changed) => now - changed >= chrono::Duration::days(rotation_days),
            None => true,
        }
    }
}
