//! Refresh token store: persistence-facing operations on refresh tokens

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainResult;
use crate::repositories::TokenRepository;

/// Refresh token persistence with the configured lifetime applied
pub struct RefreshTokenStore<R: TokenRepository> {
    repository: Arc<R>,
    lifetime: Duration,
}

impl<R: TokenRepository> Clone for RefreshTokenStore<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            lifetime: self.lifetime,
        }
    }
}

impl<R: TokenRepository> RefreshTokenStore<R> {
    /// Creates a store over `repository` issuing tokens valid for `lifetime`
    pub fn new(repository: Arc<R>, lifetime: Duration) -> Self {
        Self { repository, lifetime }
    }

    /// Checks that `token` exists, belongs to `user_id` and is active
    ///
    /// A blank token is simply not valid.
    ///
    /// # Returns
    ///
    /// * `Ok(bool)` - Whether the token may be exchanged
    /// * `Err(DomainError)` - The backend could not be queried
    pub async fn validate_refresh_token(&self, token: &str, user_id: Uuid) -> DomainResult<bool> {
        if token.trim().is_empty() {
            return Ok(false);
        }
        self.repository.is_token_active(token, user_id, Utc::now()).await
    }

    /// Persists a new refresh token row
    ///
    /// Always inserts; an existing row is never updated.
    pub async fn save_refresh_token(
        &self,
        user_id: Uuid,
        token: String,
        ip_address: Option<String>,
        device_info: Option<String>,
    ) -> DomainResult<RefreshToken> {
        let record = RefreshToken::new(user_id, token, self.lifetime, ip_address, device_info);
        let saved = self.repository.save_refresh_token(record).await?;
        debug!(user_id = %user_id, token_id = %saved.id, "Refresh token stored");
        Ok(saved)
    }

    /// Validates and revokes `token` in a single atomic step
    ///
    /// Of several concurrent calls with the same token at most one returns
    /// `true`.
    pub async fn consume_refresh_token(&self, token: &str, user_id: Uuid) -> DomainResult<bool> {
        if token.trim().is_empty() {
            return Ok(false);
        }
        self.repository.consume_token(token, user_id, Utc::now()).await
    }

    /// Active sessions of a user, newest first
    pub async fn active_sessions(&self, user_id: Uuid) -> DomainResult<Vec<RefreshToken>> {
        self.repository.find_active_by_user(user_id, Utc::now()).await
    }

    /// Deletes every token past its expiry, revoked or not
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of tokens removed
    /// * `Err(DomainError)` - Cleanup failed
    pub async fn cleanup_expired_tokens(&self) -> DomainResult<usize> {
        let deleted = self.repository.delete_expired_tokens(Utc::now()).await?;
        if deleted > 0 {
            info!(deleted, "Removed expired refresh tokens");
        }
        Ok(deleted)
    }

    /// Lifetime applied to newly saved tokens
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}
