//! Refresh token revocation

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::repositories::TokenRepository;

/// Revokes single tokens or every active token of a user
pub struct RevocationManager<R: TokenRepository> {
    repository: Arc<R>,
}

impl<R: TokenRepository> RevocationManager<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Revokes a specific refresh token
    ///
    /// Unknown, blank and already revoked tokens are a successful no-op.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The token was active and is now revoked
    /// * `Ok(false)` - Nothing changed
    /// * `Err(DomainError)` - The backend failed
    pub async fn revoke_refresh_token(&self, token: &str) -> DomainResult<bool> {
        if token.trim().is_empty() {
            return Ok(false);
        }

        let revoked = self.repository.revoke_token(token, Utc::now()).await?;
        if revoked {
            info!("Refresh token revoked");
        } else {
            debug!("Refresh token revocation was a no-op");
        }
        Ok(revoked)
    }

    /// Revokes all active tokens of a user in one write
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of tokens revoked
    /// * `Err(DomainError)` - The backend failed
    pub async fn revoke_all_user_tokens(&self, user_id: Uuid) -> DomainResult<usize> {
        let revoked = self
            .repository
            .revoke_all_user_tokens(user_id, Utc::now())
            .await?;
        info!(user_id = %user_id, revoked, "Revoked all refresh tokens for user");
        Ok(revoked)
    }
}
