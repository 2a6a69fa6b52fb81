//! Business services containing the token lifecycle and authentication flows.

pub mod auth;
pub mod token;

// Re-export commonly used types
pub use auth::{AuthService, CredentialVerifier};
pub use token::{
    CleanupResult, RefreshTokenStore, RevocationManager, SigningKeys, TokenCleanupService,
    TokenIssuer, TokenService, TokenServiceConfig, TokenValidator,
};
