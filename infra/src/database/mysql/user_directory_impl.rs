//! MySQL-backed user lookups for the authentication flow.
//!
//! Passwords are stored as bcrypt hashes. Roles come from `user_roles`; a role
//! string the domain does not know is skipped rather than failing the login.

use async_trait::async_trait;
use sqlx::{mysql::MySqlRow, MySqlPool, Row};
use uuid::Uuid;

use rh_core::domain::entities::{AccountStatus, Principal, Role};
use rh_core::errors::{AuthError, DomainError};
use rh_core::services::{CredentialAuthenticator, UserDirectory};

const SELECT_USER: &str = r#"
    SELECT id, public_id, email, display_name, password_hash, status, password_changed_at
    FROM users
"#;

/// User directory backed by the `users` and `user_roles` tables
pub struct MySqlUserDirectory {
    pool: MySqlPool,
}

impl MySqlUserDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn load_roles(&self, user_id: i64) -> Result<Vec<Role>, DomainError> {
        let rows = sqlx::query("SELECT role FROM user_roles WHERE user_id = ? ORDER BY role")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("load user roles", e))?;

        let mut roles = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: String = row.try_get("role").map_err(|e| column_error("role", e))?;
            match raw.parse::<Role>() {
                Ok(role) if !roles.contains(&role) => roles.push(role),
                Ok(_) => {}
                Err(_) => tracing::warn!(user_id, role = %raw, "Skipping unknown role"),
            }
        }
        Ok(roles)
    }

    /// Principal plus stored password hash
    async fn to_principal(&self, row: &MySqlRow) -> Result<(Principal, String), DomainError> {
        let user_id: i64 = row.try_get("id").map_err(|e| column_error("id", e))?;
        let public_id: String = row
            .try_get("public_id")
            .map_err(|e| column_error("public_id", e))?;
        let status: String = row.try_get("status").map_err(|e| column_error("status", e))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| column_error("password_hash", e))?;

        let status = status.parse::<AccountStatus>().unwrap_or_else(|_| {
            tracing::warn!(user_id, status = %status, "Unknown account status, treating as disabled");
            AccountStatus::Disabled
        });

        let principal = Principal {
            id: Uuid::parse_str(&public_id).map_err(|e| DomainError::Internal {
                message: format!("Invalid user UUID: {}", e),
            })?,
            user_id,
            email: row.try_get("email").map_err(|e| column_error("email", e))?,
            display_name: row
                .try_get("display_name")
                .map_err(|e| column_error("display_name", e))?,
            roles: self.load_roles(user_id).await?,
            status,
            password_changed_at: row
                .try_get("password_changed_at")
                .map_err(|e| column_error("password_changed_at", e))?,
        };

        Ok((principal, password_hash))
    }
}

fn column_error(column: &str, e: sqlx::Error) -> DomainError {
    DomainError::Internal {
        message: format!("Failed to get {}: {}", column, e),
    }
}

fn query_error(action: &str, e: sqlx::Error) -> DomainError {
    tracing::error!(error = %e, "Failed to {}", action);
    DomainError::storage(format!("Failed to {}: {}", action, e))
}

/// bcrypt is CPU bound, so it runs off the async workers
async fn verify_password(password: &str, hash: String) -> Result<bool, DomainError> {
    let password = password.to_string();
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Password check aborted: {}", e),
        })?;

    match outcome {
        Ok(matched) => Ok(matched),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is unreadable");
            Ok(false)
        }
    }
}

#[async_trait]
impl CredentialAuthenticator for MySqlUserDirectory {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Principal, DomainError> {
        let query = format!("{} WHERE email = ? LIMIT 1", SELECT_USER);

        let row = sqlx::query(&query)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("find user by email", e))?
            .ok_or(DomainError::Auth(AuthError::InvalidCredentials))?;

        let (principal, password_hash) = self.to_principal(&row).await?;

        if !verify_password(password, password_hash).await? {
            return Err(DomainError::Auth(AuthError::InvalidCredentials));
        }
        if !principal.is_active() {
            return Err(DomainError::Auth(AuthError::AccountDisabled));
        }
        Ok(principal)
    }
}

#[async_trait]
impl UserDirectory for MySqlUserDirectory {
    async fn load_by_id(&self, user_id: i64) -> Result<Option<Principal>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_USER);

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("find user by id", e))?;

        match row {
            Some(row) => Ok(Some(self.to_principal(&row).await?.0)),
            None => Ok(None),
        }
    }
}
