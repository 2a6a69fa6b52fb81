//! Configuration for the token service

use chrono::Duration;
use sg_shared::config::{JwtConfig, TokenPolicyConfig};
use sg_shared::ConfigResult;

/// Resolved token lifecycle settings
///
/// Built once from the startup configuration; the signing secret itself
/// lives in [`SigningKeys`](super::SigningKeys).
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Expected and emitted `iss` claim
    pub issuer: String,
    /// Expected and emitted `aud` claim
    pub audience: String,
    /// Access token lifetime
    pub access_token_lifetime: Duration,
    /// Refresh token lifetime
    pub refresh_token_lifetime: Duration,
    /// Revoke a refresh token atomically when it is exchanged
    pub rotate_refresh_tokens: bool,
}

impl TokenServiceConfig {
    /// Derive the token settings from startup configuration
    ///
    /// Lifetimes outside the accepted range are rejected here, before they
    /// ever reach timestamp arithmetic.
    pub fn from_config(jwt: &JwtConfig, policy: &TokenPolicyConfig) -> ConfigResult<Self> {
        jwt.validate()?;
        Ok(Self {
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
            access_token_lifetime: Duration::seconds(jwt.access_token_expiry_seconds()),
            refresh_token_lifetime: Duration::seconds(jwt.refresh_token_expiry_seconds()),
            rotate_refresh_tokens: policy.rotate_refresh_tokens,
        })
    }
}
