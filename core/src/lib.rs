//! # SessionGuard Core
//!
//! Token lifecycle domain layer for SessionGuard.
//! This crate contains the principal and token entities, repository interfaces,
//! the token and authentication services, and the error types shared by every
//! storage backend.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{Claims, Principal, RefreshToken, TokenPair, REFRESH_TOKEN_BYTES};
pub use errors::{AuthError, DomainError, DomainResult, TokenError};
pub use repositories::{InMemoryTokenRepository, TokenRepository, UserDirectory};
pub use services::{
    AuthService, CleanupResult, CredentialVerifier, RefreshTokenStore, RevocationManager,
    SigningKeys, TokenCleanupService, TokenIssuer, TokenService, TokenServiceConfig,
    TokenValidator,
};
