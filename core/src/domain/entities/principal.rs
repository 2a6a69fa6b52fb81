//! Principal entity: the authenticated identity a token represents.
//!
//! Principals are owned by the user directory; this crate only reads them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated user as seen by the token lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Login name
    pub username: String,

    /// Email address (may be empty)
    #[serde(default)]
    pub email: String,

    /// Full name used as the display name claim (may be empty)
    #[serde(default)]
    pub full_name: String,
}

impl Principal {
    /// Creates a new Principal instance
    pub fn new(
        id: Uuid,
        username: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            full_name: full_name.into(),
        }
    }

    /// Display name, if the user has one
    pub fn display_name(&self) -> Option<&str> {
        let name = self.full_name.trim();
        (!name.is_empty()).then_some(name)
    }
}
