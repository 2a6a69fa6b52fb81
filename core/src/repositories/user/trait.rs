//! User directory trait: read-only access to principals and their roles.
//!
//! The directory is owned by the surrounding application; the token
//! lifecycle only looks principals up and never writes to it.

use std::collections::BTreeSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::principal::Principal;
use crate::errors::DomainError;

/// Lookup interface onto the application's users
///
/// # Example Implementation
/// ```no_run
/// use std::collections::BTreeSet;
/// use async_trait::async_trait;
/// use uuid::Uuid;
/// use sg_core::repositories::UserDirectory;
/// use sg_core::domain::entities::Principal;
/// use sg_core::errors::DomainError;
///
/// struct StaticDirectory;
///
/// #[async_trait]
/// impl UserDirectory for StaticDirectory {
///     async fn find_by_id(&self, _id: Uuid) -> Result<Option<Principal>, DomainError> {
///         Ok(None)
///     }
///     async fn find_by_username(&self, _username: &str) -> Result<Option<Principal>, DomainError> {
///         Ok(None)
///     }
///     async fn find_by_email(&self, _email: &str) -> Result<Option<Principal>, DomainError> {
///         Ok(None)
///     }
///     async fn roles_of(&self, _principal: &Principal) -> Result<BTreeSet<String>, DomainError> {
///         Ok(BTreeSet::new())
///     }
/// }
/// ```
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a principal by identifier
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, DomainError>;

    /// Find a principal by username
    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, DomainError>;

    /// Find a principal by email address
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DomainError>;

    /// Role names currently assigned to the principal
    async fn roles_of(&self, principal: &Principal) -> Result<BTreeSet<String>, DomainError>;
}
