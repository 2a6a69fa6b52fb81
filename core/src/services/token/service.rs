//! Main token service implementation

use std::collections::BTreeSet;
use std::sync::Arc;

use sg_shared::config::{JwtConfig, TokenPolicyConfig};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::principal::Principal;
use crate::domain::entities::token::{Claims, RefreshToken, TokenPair};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::{TokenRepository, UserDirectory};

use super::config::TokenServiceConfig;
use super::issuer::TokenIssuer;
use super::key_manager::SigningKeys;
use super::revocation::RevocationManager;
use super::store::RefreshTokenStore;
use super::validator::TokenValidator;

/// Service for the full access/refresh token lifecycle
pub struct TokenService<R: TokenRepository, U: UserDirectory> {
    issuer: TokenIssuer,
    validator: TokenValidator,
    store: RefreshTokenStore<R>,
    revocation: RevocationManager<R>,
    directory: Arc<U>,
    config: TokenServiceConfig,
}

impl<R: TokenRepository, U: UserDirectory> TokenService<R, U> {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `repository` - Token repository for persistence
    /// * `directory` - User directory for principal lookups
    /// * `jwt` - JWT configuration (secret, issuer, audience, lifetimes)
    /// * `policy` - Refresh token policy
    ///
    /// # Returns
    ///
    /// A new `TokenService`, or a configuration error if no signing secret is
    /// configured or a lifetime is out of range
    pub fn new(
        repository: Arc<R>,
        directory: Arc<U>,
        jwt: &JwtConfig,
        policy: &TokenPolicyConfig,
    ) -> DomainResult<Self> {
        let keys = SigningKeys::from_secret(&jwt.secret)?;
        let config = TokenServiceConfig::from_config(jwt, policy)?;
        Ok(Self::with_keys(repository, directory, keys, config))
    }

    /// Creates a token service from already resolved keys and settings
    pub fn with_keys(
        repository: Arc<R>,
        directory: Arc<U>,
        keys: SigningKeys,
        config: TokenServiceConfig,
    ) -> Self {
        Self {
            issuer: TokenIssuer::new(keys.clone(), config.clone()),
            validator: TokenValidator::new(keys, &config),
            store: RefreshTokenStore::new(Arc::clone(&repository), config.refresh_token_lifetime),
            revocation: RevocationManager::new(repository),
            directory,
            config,
        }
    }

    /// Generates a new token pair and persists the refresh token
    ///
    /// Every call inserts exactly one new refresh token row.
    ///
    /// # Arguments
    ///
    /// * `principal` - The user the tokens are for
    /// * `roles` - Role names to embed in the access token
    /// * `ip_address` - Client IP, stored with the refresh token
    /// * `device_info` - Client device, stored with the refresh token
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The generated token pair
    /// * `Err(DomainError::Validation)` - The principal has the nil id
    /// * `Err(DomainError)` - Signing or persistence failed
    pub async fn generate_tokens(
        &self,
        principal: &Principal,
        roles: &BTreeSet<String>,
        ip_address: Option<String>,
        device_info: Option<String>,
    ) -> DomainResult<TokenPair> {
        if principal.id.is_nil() {
            return Err(DomainError::Validation {
                message: "principal id must not be empty".to_string(),
            });
        }

        let (access_token, expires_at) = self.issuer.issue_access_token(principal, roles)?;

        let refresh = self
            .store
            .save_refresh_token(
                principal.id,
                TokenIssuer::generate_refresh_token(),
                ip_address,
                device_info,
            )
            .await?;

        info!(user_id = %principal.id, roles = roles.len(), "Issued token pair");

        Ok(TokenPair {
            access_token,
            refresh_token: refresh.token,
            expires_at,
            refresh_expires_at: refresh.expires_at,
        })
    }

    /// Verifies an access token and returns its claims
    pub fn validate_access_token(&self, token: &str) -> Option<Claims> {
        self.validator.validate_access_token(token)
    }

    /// Identifies the principal behind a possibly expired access token
    ///
    /// Signature, algorithm, issuer and audience must check out; only the
    /// lifetime is ignored. The subject must parse as a user id that the
    /// directory still knows. Any failure yields `None`.
    pub async fn extract_principal_from_expired_token(&self, token: &str) -> Option<Principal> {
        let claims = self.validator.decode_expired_token(token)?;

        let user_id = match claims.user_id() {
            Ok(id) => id,
            Err(_) => {
                debug!(reason = %TokenError::InvalidClaims, "Expired token subject is not a user id");
                return None;
            }
        };

        match self.directory.find_by_id(user_id).await {
            Ok(Some(principal)) => Some(principal),
            Ok(None) => {
                debug!(user_id = %user_id, "Expired token subject no longer exists");
                None
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "User lookup failed during token refresh");
                None
            }
        }
    }

    /// Checks that a refresh token is active and belongs to `user_id`
    pub async fn validate_refresh_token(&self, token: &str, user_id: Uuid) -> DomainResult<bool> {
        self.store.validate_refresh_token(token, user_id).await
    }

    /// Exchanges an expired access token and a refresh token for a new pair
    ///
    /// With rotation enabled the presented refresh token is consumed in one
    /// atomic step before anything is issued, so two concurrent calls with
    /// the same token cannot both succeed. Without rotation the token is
    /// only checked and stays usable.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(TokenPair))` - New pair issued
    /// * `Ok(None)` - Either token is invalid
    /// * `Err(DomainError)` - A backend failed
    pub async fn refresh_tokens(
        &self,
        expired_access_token: &str,
        refresh_token: &str,
        ip_address: Option<String>,
        device_info: Option<String>,
    ) -> DomainResult<Option<TokenPair>> {
        let Some(principal) = self.extract_principal_from_expired_token(expired_access_token).await
        else {
            return Ok(None);
        };

        let accepted = if self.config.rotate_refresh_tokens {
            self.store.consume_refresh_token(refresh_token, principal.id).await?
        } else {
            self.store.validate_refresh_token(refresh_token, principal.id).await?
        };

        if !accepted {
            warn!(
                user_id = %principal.id,
                reason = %TokenError::InvalidRefreshToken,
                "Refresh attempted with an inactive refresh token"
            );
            return Ok(None);
        }

        let roles = self.directory.roles_of(&principal).await?;
        self.generate_tokens(&principal, &roles, ip_address, device_info)
            .await
            .map(Some)
    }

    /// Revokes a specific refresh token; unknown or revoked tokens are a no-op
    pub async fn revoke_refresh_token(&self, token: &str) -> DomainResult<bool> {
        self.revocation.revoke_refresh_token(token).await
    }

    /// Revokes all active refresh tokens of a user
    pub async fn revoke_all_user_tokens(&self, user_id: Uuid) -> DomainResult<usize> {
        self.revocation.revoke_all_user_tokens(user_id).await
    }

    /// Active sessions of a user, newest first
    pub async fn active_sessions(&self, user_id: Uuid) -> DomainResult<Vec<RefreshToken>> {
        self.store.active_sessions(user_id).await
    }

    /// Removes expired tokens from storage
    pub async fn cleanup_expired_tokens(&self) -> DomainResult<usize> {
        self.store.cleanup_expired_tokens().await
    }

    /// The refresh token store, e.g. to build a [`TokenCleanupService`](super::TokenCleanupService)
    pub fn store(&self) -> &RefreshTokenStore<R> {
        &self.store
    }

    /// The user directory this service resolves principals through
    pub fn directory(&self) -> &Arc<U> {
        &self.directory
    }

    /// Resolved token settings
    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }
}
