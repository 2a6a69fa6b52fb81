//! Authentication service module
//!
//! Login, refresh and logout flows on top of the token service:
//! - Principal lookup by username or email and password check
//! - Token pair issuance and refresh with coarse error reporting
//! - Logout of one session or every session of a user

mod credentials;
mod service;

#[cfg(test)]
mod tests;

pub use credentials::CredentialVerifier;
pub use service::AuthService;
