//! MySQL implementation of the TokenRepository trait.
//!
//! Refresh tokens live in the `refresh_tokens` table (see
//! `infra/migrations`). Every conditional write is one `UPDATE` or `DELETE`
//! statement, so concurrent callers racing on the same row are serialised by
//! the database and at most one of them sees an affected row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use sg_core::domain::entities::token::RefreshToken;
use sg_core::errors::DomainError;
use sg_core::repositories::TokenRepository;

const SELECT_COLUMNS: &str = r#"
    SELECT id, token, user_id, expires_at, created_at, is_revoked, revoked_at,
           ip_address, device_info
    FROM refresh_tokens
"#;

/// MySQL implementation of TokenRepository
#[derive(Clone)]
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshToken entity
    fn row_to_token(row: &MySqlRow) -> Result<RefreshToken, DomainError> {
        let id: String = row.try_get("id").map_err(column_error("id"))?;
        let user_id: String = row.try_get("user_id").map_err(column_error("user_id"))?;

        Ok(RefreshToken {
            id: Uuid::parse_str(&id)
                .map_err(|e| DomainError::persistence(format!("Invalid token UUID: {}", e)))?,
            token: row.try_get("token").map_err(column_error("token"))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| DomainError::persistence(format!("Invalid user UUID: {}", e)))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(column_error("expires_at"))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(column_error("created_at"))?,
            is_revoked: row.try_get("is_revoked").map_err(column_error("is_revoked"))?,
            revoked_at: row
                .try_get::<Option<DateTime<Utc>>, _>("revoked_at")
                .map_err(column_error("revoked_at"))?,
            ip_address: row.try_get("ip_address").map_err(column_error("ip_address"))?,
            device_info: row.try_get("device_info").map_err(column_error("device_info"))?,
        })
    }
}

fn column_error(column: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::persistence(format!("Failed to read column {}: {}", column, e))
}

/// Map a query failure to a persistence error and log it
fn query_error(action: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| {
        tracing::error!(error = %e, "Failed to {}", action);
        DomainError::persistence(format!("Failed to {}: {}", action, e))
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, token, user_id, expires_at, created_at, is_revoked, revoked_at,
                ip_address, device_info
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.id.to_string())
            .bind(&token.token)
            .bind(token.user_id.to_string())
            .bind(token.expires_at)
            .bind(token.created_at)
            .bind(token.is_revoked)
            .bind(token.revoked_at)
            .bind(&token.ip_address)
            .bind(&token.device_info)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    tracing::error!(user_id = %token.user_id, "Refresh token value collision");
                    DomainError::persistence("duplicate refresh token value")
                }
                _ => query_error("save refresh token")(e),
            })?;

        Ok(token)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, DomainError> {
        let query = format!("{} WHERE token = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("find refresh token"))?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshToken>, DomainError> {
        let query = format!(
            "{} WHERE user_id = ? AND is_revoked = FALSE AND expires_at > ? ORDER BY created_at DESC",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("find user tokens"))?;

        rows.iter().map(Self::row_to_token).collect()
    }

    async fn revoke_token(&self, token: &str, revoked_at: DateTime<Utc>) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_at = ?
            WHERE token = ? AND is_revoked = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(revoked_at)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(query_error("revoke refresh token"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_user_tokens(
        &self,
        user_id: Uuid,
        revoked_at: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_at = ?
            WHERE user_id = ? AND is_revoked = FALSE AND expires_at > ?
        "#;

        let result = sqlx::query(query)
            .bind(revoked_at)
            .bind(user_id.to_string())
            .bind(revoked_at)
            .execute(&self.pool)
            .await
            .map_err(query_error("revoke user tokens"))?;

        Ok(result.rows_affected() as usize)
    }

    async fn consume_token(
        &self,
        token: &str,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_at = ?
            WHERE token = ? AND user_id = ? AND is_revoked = FALSE AND expires_at > ?
        "#;

        let result = sqlx::query(query)
            .bind(now)
            .bind(token)
            .bind(user_id.to_string())
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(query_error("consume refresh token"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(query_error("delete expired tokens"))?;

        Ok(result.rows_affected() as usize)
    }
}
