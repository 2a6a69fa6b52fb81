//! Access token signing and refresh token generation

use std::collections::BTreeSet;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Header};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::domain::entities::principal::Principal;
use crate::domain::entities::token::{Claims, REFRESH_TOKEN_BYTES};
use crate::errors::{DomainError, TokenError};

use super::config::TokenServiceConfig;
use super::key_manager::SigningKeys;

/// Builds signed access tokens and opaque refresh token values
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: SigningKeys,
    config: TokenServiceConfig,
}

impl TokenIssuer {
    pub fn new(keys: SigningKeys, config: TokenServiceConfig) -> Self {
        Self { keys, config }
    }

    /// Signs an access token for the principal
    ///
    /// # Returns
    ///
    /// * `Ok((String, DateTime<Utc>))` - The compact JWT and its expiry
    /// * `Err(DomainError)` - Signing failed
    pub fn issue_access_token(
        &self,
        principal: &Principal,
        roles: &BTreeSet<String>,
    ) -> Result<(String, DateTime<Utc>), DomainError> {
        let claims = Claims::new_access_token(
            principal,
            roles,
            &self.config.issuer,
            &self.config.audience,
            Utc::now(),
            self.config.access_token_lifetime,
        );
        let token = self.encode_jwt(&claims)?;
        Ok((token, claims.expires_at()))
    }

    /// Encodes claims into a JWT
    pub(crate) fn encode_jwt(&self, claims: &Claims) -> Result<String, DomainError> {
        let header = Header::new(self.keys.algorithm());
        encode(&header, claims, self.keys.encoding_key())
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }

    /// Generates an opaque refresh token value
    ///
    /// 64 bytes from the operating system CSPRNG, base64 encoded. Uniqueness
    /// is enforced by the repository, not by retrying here.
    pub fn generate_refresh_token() -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        STANDARD.encode(bytes)
    }
}
