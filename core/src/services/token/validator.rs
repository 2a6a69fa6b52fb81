//! Access token validation
//!
//! Validation failure is an expected outcome. The `check_*` entry points
//! report why a token was refused as a [`TokenError`]; the `Option` wrappers
//! used by the service log that reason at debug level and drop it.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Validation};
use tracing::debug;

use crate::domain::entities::token::Claims;
use crate::errors::TokenError;

use super::config::TokenServiceConfig;
use super::key_manager::SigningKeys;

/// Verifies signature and claims of access tokens
#[derive(Clone)]
pub struct TokenValidator {
    keys: SigningKeys,
    /// Full validation for ordinary requests
    validation: Validation,
    /// Same checks with lifetime disabled, for the refresh flow
    expired_validation: Validation,
}

impl TokenValidator {
    pub fn new(keys: SigningKeys, config: &TokenServiceConfig) -> Self {
        let mut validation = Validation::new(keys.algorithm());
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let mut expired_validation = validation.clone();
        expired_validation.validate_exp = false;
        expired_validation.validate_nbf = false;

        Self {
            keys,
            validation,
            expired_validation,
        }
    }

    /// Verifies an access token and returns the claims
    ///
    /// Checks signature, issuer, audience, not-before and expiry with zero
    /// clock skew. Any failure yields `None`.
    pub fn validate_access_token(&self, token: &str) -> Option<Claims> {
        self.check_access_token(token)
            .map_err(|reason| debug!(%reason, "Access token rejected"))
            .ok()
    }

    /// Like [`validate_access_token`](Self::validate_access_token), keeping the reason
    pub fn check_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, self.keys.decoding_key(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| classify(e.kind()))
    }

    /// Verifies an access token whose lifetime may have elapsed
    ///
    /// The header algorithm must equal the signing algorithm before any
    /// claim is read, so `alg: none` or an asymmetric algorithm is refused
    /// outright. Signature, issuer and audience are still enforced.
    pub fn decode_expired_token(&self, token: &str) -> Option<Claims> {
        self.check_expired_token(token)
            .map_err(|reason| debug!(%reason, "Expired token rejected"))
            .ok()
    }

    /// Like [`decode_expired_token`](Self::decode_expired_token), keeping the reason
    pub fn check_expired_token(&self, token: &str) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(|e| classify(e.kind()))?;
        if header.alg != self.keys.algorithm() {
            debug!(alg = ?header.alg, "Expired token uses an unexpected algorithm");
            return Err(TokenError::InvalidSignature);
        }

        decode::<Claims>(token, self.keys.decoding_key(), &self.expired_validation)
            .map(|data| data.claims)
            .map_err(|e| classify(e.kind()))
    }
}

/// Folds jsonwebtoken's failure kinds into the token errors we log
fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::ExpiredSignature => TokenError::TokenExpired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => TokenError::InvalidClaims,
        _ => TokenError::InvalidTokenFormat,
    }
}
