//! MySQL implementation of the RefreshTokenRepository trait.
//!
//! Rows are keyed by the SHA-256 hex digest of the refresh token. The
//! conditional `revoked = FALSE` update is what makes rotation single-use when
//! two requests race on the same token.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlRow, MySqlPool, Row};
use uuid::Uuid;

use rh_core::domain::entities::StoredRefreshToken;
use rh_core::errors::DomainError;
use rh_core::repositories::RefreshTokenRepository;

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, token_value, device_id, device_info, ip_address,
           created_at, expires_at, revoked
    FROM refresh_tokens
"#;

/// MySQL implementation of RefreshTokenRepository
pub struct MySqlRefreshTokenRepository {
    pool: MySqlPool,
}

impl MySqlRefreshTokenRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: &MySqlRow) -> Result<StoredRefreshToken, DomainError> {
        let id: String = row.try_get("id").map_err(|e| column_error("id", e))?;

        Ok(StoredRefreshToken {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid refresh token UUID: {}", e),
            })?,
            user_id: row.try_get("user_id").map_err(|e| column_error("user_id", e))?,
            token_value: row
                .try_get("token_value")
                .map_err(|e| column_error("token_value", e))?,
            device_id: row
                .try_get("device_id")
                .map_err(|e| column_error("device_id", e))?,
            device_info: row
                .try_get("device_info")
                .map_err(|e| column_error("device_info", e))?,
            ip_address: row
                .try_get("ip_address")
                .map_err(|e| column_error("ip_address", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| column_error("created_at", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| column_error("expires_at", e))?,
            revoked: row.try_get("revoked").map_err(|e| column_error("revoked", e))?,
        })
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

#[async_trait]
impl RefreshTokenRepository for MySqlRefreshTokenRepository {
    async fn save(&self, token: StoredRefreshToken) -> Result<StoredRefreshToken, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, user_id, token_value, device_id, device_info, ip_address,
                created_at, expires_at, revoked
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.id.to_string())
            .bind(token.user_id)
            .bind(&token.token_value)
            .bind(&token.device_id)
            .bind(&token.device_info)
            .bind(&token.ip_address)
            .bind(token.created_at)
            .bind(token.expires_at)
            .bind(token.revoked)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::Validation {
                    message: "Token already exists".to_string(),
                },
                _ => query_error("save refresh token", e),
            })?;

        Ok(token)
    }

    async fn find_by_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<StoredRefreshToken>, DomainError> {
        let query = format!("{} WHERE token_value = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error("find refresh token", e))?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE token_value = ? AND revoked = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("revoke refresh token", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_active_by_user(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<StoredRefreshToken>, DomainError> {
        let query = format!(
            "{} WHERE user_id = ? AND revoked = FALSE AND expires_at > ? ORDER BY created_at DESC",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("find user refresh tokens", e))?;

        rows.iter().map(Self::row_to_token).collect()
    }

    async fn revoke_all_for_user(&self, user_id: i64) -> Result<usize, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE user_id = ? AND revoked = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("revoke user refresh tokens", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error("delete expired refresh tokens", e))?;

        Ok(result.rows_affected() as usize)
    }
}
