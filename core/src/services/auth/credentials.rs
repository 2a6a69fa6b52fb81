//! Password verification seam for the authentication service

use async_trait::async_trait;

use crate::domain::entities::principal::Principal;
use crate::errors::DomainError;

/// Checks a presented password against a principal's stored credential
///
/// Hashing scheme and storage are up to the implementation.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Whether `password` is the principal's current password
    async fn verify_password(&self, principal: &Principal, password: &str) -> Result<bool, DomainError>;
}
