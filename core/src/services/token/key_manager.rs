//! Signing key provider for HMAC-SHA256 access tokens

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use tracing::warn;

use crate::errors::{DomainError, TokenError};

/// The only algorithm tokens are signed and accepted with
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Secrets shorter than this still work but are reported at startup
pub const RECOMMENDED_SECRET_BYTES: usize = 32;

/// Symmetric key material for signing and verifying access tokens
#[derive(Clone)]
pub struct SigningKeys {
    /// Key used to sign new tokens
    encoding_key: EncodingKey,
    /// Key used to verify presented tokens
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys")
            .field("algorithm", &SIGNING_ALGORITHM)
            .finish_non_exhaustive()
    }
}

impl SigningKeys {
    /// Creates the key pair from a shared secret
    ///
    /// # Returns
    ///
    /// * `Ok(SigningKeys)` - Keys ready for use
    /// * `Err(DomainError)` - The secret is empty; there is no fallback
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sg_core::services::token::SigningKeys;
    ///
    /// let keys = SigningKeys::from_secret("a-long-random-deployment-secret-value")
    ///     .expect("JWT secret must be configured");
    /// ```
    pub fn from_secret(secret: &str) -> Result<Self, DomainError> {
        if secret.trim().is_empty() {
            return Err(DomainError::Token(TokenError::MissingSigningKey));
        }
        if secret.len() < RECOMMENDED_SECRET_BYTES {
            warn!(
                secret_len = secret.len(),
                "JWT signing secret is shorter than {} bytes", RECOMMENDED_SECRET_BYTES
            );
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Gets the encoding key for signing
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Gets the decoding key for verification
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Algorithm used with these keys
    pub fn algorithm(&self) -> Algorithm {
        SIGNING_ALGORITHM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_is_rejected() {
        for secret in ["", "   "] {
            let err = SigningKeys::from_secret(secret).unwrap_err();
            assert!(matches!(err, DomainError::Token(TokenError::MissingSigningKey)));
        }
    }

    #[test]
    fn test_debug_hides_key_material() {
        let keys = SigningKeys::from_secret("very-secret-material-for-testing-only").unwrap();
        let debug = format!("{:?}", keys);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("HS256"));
    }
}
