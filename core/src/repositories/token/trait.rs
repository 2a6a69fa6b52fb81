//! Token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

/// Repository trait for RefreshToken entity persistence operations
///
/// The contract is deliberately small (insert, lookup, conditional update,
/// delete by time) so that relational and key-value backends can both
/// implement it. Every state change is a single conditional write:
/// implementations must apply the predicate and the update atomically
/// (e.g. `UPDATE ... WHERE token = ? AND is_revoked = FALSE`), which is
/// what serialises concurrent callers. No in-process locks are assumed.
///
/// # Errors
/// Backend failures are reported as `DomainError::Persistence`. A missing
/// row is never an error.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Insert a new refresh token
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The stored row
    /// * `Err(DomainError)` - Insert failed (duplicate token value, backend down)
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::Duration;
    /// # use uuid::Uuid;
    /// # use sg_core::repositories::TokenRepository;
    /// # use sg_core::domain::entities::token::RefreshToken;
    /// # async fn example(repo: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let token = RefreshToken::new(Uuid::new_v4(), "opaque".to_string(), Duration::days(7), None, None);
    /// let saved = repo.save_refresh_token(token).await?;
    /// println!("Token saved with ID: {}", saved.id);
    /// # Ok(())
    /// # }
    /// ```
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token by its exact value
    ///
    /// # Returns
    /// * `Ok(Some(RefreshToken))` - Token found (in any state)
    /// * `Ok(None)` - No token with that value
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// Find the active tokens of a user, newest first
    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshToken>, DomainError>;

    /// Mark one token revoked if it is not already
    ///
    /// # Returns
    /// * `Ok(true)` - The row changed state
    /// * `Ok(false)` - Not found or already revoked
    async fn revoke_token(&self, token: &str, revoked_at: DateTime<Utc>) -> Result<bool, DomainError>;

    /// Mark every active token of a user revoked in one write
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows that changed state
    async fn revoke_all_user_tokens(
        &self,
        user_id: Uuid,
        revoked_at: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Validate and revoke in one step
    ///
    /// Succeeds only for a token that belongs to `user_id` and is active at
    /// `now`; of several concurrent callers presenting the same token, at
    /// most one observes `true`.
    async fn consume_token(
        &self,
        token: &str,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Delete every token with `expires_at < now`, revoked or not
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows deleted
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::Utc;
    /// # use sg_core::repositories::TokenRepository;
    /// # async fn example(repo: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let deleted = repo.delete_expired_tokens(Utc::now()).await?;
    /// println!("Cleaned up {} expired tokens", deleted);
    /// # Ok(())
    /// # }
    /// ```
    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Check that a token exists, belongs to `user_id` and is active
    async fn is_token_active(
        &self,
        token: &str,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        Ok(self
            .find_by_token(token)
            .await?
            .is_some_and(|t| t.user_id == user_id && t.is_active_at(now)))
    }
}
