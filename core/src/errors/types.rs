//! Error types for authentication and token management
//!
//! `AuthError` is what outer callers see. `TokenError` carries the internal
//! distinction (expired, bad signature, bad claims, inactive refresh token)
//! and is only logged, apart from the two issuance failures.

use thiserror::Error;

/// Authentication-related errors
///
/// Deliberately coarse: a caller cannot tell a wrong password from an
/// unknown user, or a revoked refresh token from an expired one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Login failed")]
    AuthenticationFailed,

    #[error("Session expired, please log in again")]
    SessionExpired,
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid claims")]
    InvalidClaims,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Token generation failed")]
    TokenGenerationFailed,

    #[error("Signing key is not configured")]
    MissingSigningKey,
}
