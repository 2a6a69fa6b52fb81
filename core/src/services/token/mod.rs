//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Signing key resolution from configuration
//! - JWT access token generation and verification
//! - Refresh token persistence, rotation and revocation
//! - Background cleanup of expired tokens

mod cleanup;
mod config;
mod issuer;
mod key_manager;
mod revocation;
mod service;
mod store;
mod validator;

#[cfg(test)]
pub(crate) mod tests;

pub use cleanup::{CleanupResult, TokenCleanupService};
pub use config::TokenServiceConfig;
pub use issuer::TokenIssuer;
pub use key_manager::{SigningKeys, SIGNING_ALGORITHM};
pub use revocation::RevocationManager;
pub use service::TokenService;
pub use store::RefreshTokenStore;
pub use validator::TokenValidator;
