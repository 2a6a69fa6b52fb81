//! Main authentication service implementation

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::principal::Principal;
use crate::domain::entities::token::{RefreshToken, TokenPair};
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::{TokenRepository, UserDirectory};
use crate::services::token::TokenService;

use super::credentials::CredentialVerifier;

/// Authentication service for the login, refresh and logout flows
///
/// Callers only ever see [`AuthError::AuthenticationFailed`] or
/// [`AuthError::SessionExpired`] for rejected credentials. Failures to
/// write refresh tokens still surface as persistence errors.
pub struct AuthService<R, U, C>
where
    R: TokenRepository,
    U: UserDirectory,
    C: CredentialVerifier,
{
    /// Token service for issuing, refreshing and revoking tokens
    token_service: Arc<TokenService<R, U>>,
    /// Password checker
    verifier: Arc<C>,
}

impl<R, U, C> AuthService<R, U, C>
where
    R: TokenRepository,
    U: UserDirectory,
    C: CredentialVerifier,
{
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `token_service` - Service for token management; its directory is
    ///   used to resolve principals and roles
    /// * `verifier` - Password checker
    pub fn new(token_service: Arc<TokenService<R, U>>, verifier: Arc<C>) -> Self {
        Self {
            token_service,
            verifier,
        }
    }

    /// Log a user in and issue a token pair
    ///
    /// The identifier is tried as a username first, then as an email.
    ///
    /// # Arguments
    ///
    /// * `identifier` - Username or email
    /// * `password` - Plain password as entered
    /// * `ip_address` - Client IP, stored with the refresh token
    /// * `device_info` - Client device, stored with the refresh token
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Fresh access and refresh tokens
    /// * `Err(DomainError::Auth(AuthError::AuthenticationFailed))` - Unknown
    ///   user, wrong password or a failed lookup
    /// * `Err(DomainError)` - Tokens could not be issued or stored
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sg_core::repositories::{TokenRepository, UserDirectory};
    /// use sg_core::services::auth::{AuthService, CredentialVerifier};
    ///
    /// async fn sign_in<R, U, C>(auth: &AuthService<R, U, C>)
    /// where
    ///     R: TokenRepository,
    ///     U: UserDirectory,
    ///     C: CredentialVerifier,
    /// {
    ///     match auth.login("jdoe", "hunter2", Some("10.0.0.1".into()), None).await {
    ///         Ok(pair) => println!("Access token expires at {}", pair.expires_at),
    ///         Err(e) => eprintln!("{}", e),
    ///     }
    /// }
    /// ```
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        ip_address: Option<String>,
        device_info: Option<String>,
    ) -> DomainResult<TokenPair> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(AuthError::AuthenticationFailed.into());
        }

        let Some(principal) = self.resolve_principal(identifier).await else {
            debug!("Login rejected: unknown identifier");
            return Err(AuthError::AuthenticationFailed.into());
        };

        match self.verifier.verify_password(&principal, password).await {
            Ok(true) => {}
            Ok(false) => {
                info!(user_id = %principal.id, "Login rejected: wrong password");
                return Err(AuthError::AuthenticationFailed.into());
            }
            Err(e) => {
                warn!(user_id = %principal.id, error = %e, "Credential check failed");
                return Err(AuthError::AuthenticationFailed.into());
            }
        }

        let roles = match self.token_service.directory().roles_of(&principal).await {
            Ok(roles) => roles,
            Err(e) => {
                warn!(user_id = %principal.id, error = %e, "Role lookup failed during login");
                return Err(AuthError::AuthenticationFailed.into());
            }
        };

        let pair = self
            .token_service
            .generate_tokens(&principal, &roles, ip_address, device_info)
            .await?;

        info!(user_id = %principal.id, "User logged in");
        Ok(pair)
    }

    /// Exchange an expired access token and a refresh token for a new pair
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The new pair
    /// * `Err(DomainError::Auth(AuthError::SessionExpired))` - Either token
    ///   was rejected
    /// * `Err(DomainError)` - A backend failed
    pub async fn refresh(
        &self,
        expired_access_token: &str,
        refresh_token: &str,
        ip_address: Option<String>,
        device_info: Option<String>,
    ) -> DomainResult<TokenPair> {
        self.token_service
            .refresh_tokens(expired_access_token, refresh_token, ip_address, device_info)
            .await?
            .ok_or(DomainError::Auth(AuthError::SessionExpired))
    }

    /// Log out a single session by revoking its refresh token
    ///
    /// Unknown or already revoked tokens succeed silently.
    pub async fn logout(&self, refresh_token: &str) -> DomainResult<()> {
        self.token_service.revoke_refresh_token(refresh_token).await?;
        Ok(())
    }

    /// Log a user out of every session
    ///
    /// Returns how many sessions were still active.
    pub async fn logout_everywhere(&self, user_id: Uuid) -> DomainResult<usize> {
        self.token_service.revoke_all_user_tokens(user_id).await
    }

    /// Active sessions of a user, newest first
    pub async fn active_sessions(&self, user_id: Uuid) -> DomainResult<Vec<RefreshToken>> {
        self.token_service.active_sessions(user_id).await
    }

    /// The token service backing this auth service
    pub fn token_service(&self) -> &Arc<TokenService<R, U>> {
        &self.token_service
    }

    async fn resolve_principal(&self, identifier: &str) -> Option<Principal> {
        let directory = self.token_service.directory();

        match directory.find_by_username(identifier).await {
            Ok(Some(principal)) => return Some(principal),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Username lookup failed");
                return None;
            }
        }

        match directory.find_by_email(identifier).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "Email lookup failed");
                None
            }
        }
    }
}
