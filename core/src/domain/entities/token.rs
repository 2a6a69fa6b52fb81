//! Token entities for JWT-based authentication.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::Principal;

/// Number of random bytes behind every refresh token value
pub const REFRESH_TOKEN_BYTES: usize = 64;

/// Claims structure for the access token payload
///
/// Claim names are fixed for interop with existing verifiers:
/// `sub`, `email`, `unique_name`, `jti`, `iat`, `name`, `role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// User email, empty string when unknown
    #[serde(default)]
    pub email: String,

    /// Username
    pub unique_name: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Display name, only emitted when non-empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// One entry per assigned role
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "role_claim")]
    pub role: Vec<String>,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Not before timestamp
    pub nbf: i64,

    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for an access token
    ///
    /// # Arguments
    ///
    /// * `principal` - The authenticated user
    /// * `roles` - Role names to embed, one `role` claim each
    /// * `issuer` - Configured issuer
    /// * `audience` - Configured audience
    /// * `issued_at` - Issue instant, also used as not-before
    /// * `lifetime` - Access token lifetime; an expiry past the representable
    ///   range is clamped to the latest instant
    pub fn new_access_token(
        principal: &Principal,
        roles: &BTreeSet<String>,
        issuer: &str,
        audience: &str,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        let expiry = issued_at
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            sub: principal.id.to_string(),
            email: principal.email.clone(),
            unique_name: principal.username.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: issued_at.timestamp(),
            name: principal.display_name().map(str::to_string),
            role: roles.iter().cloned().collect(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            nbf: issued_at.timestamp(),
            exp: expiry.timestamp(),
        }
    }

    /// Gets the user ID from the claims
    ///
    /// # Returns
    ///
    /// `Ok(Uuid)` if the subject can be parsed as a UUID, `Err` otherwise
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// Role names carried by the token
    pub fn roles(&self) -> BTreeSet<String> {
        self.role.iter().cloned().collect()
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Serializes a single role as a scalar and several as an array; accepts both.
mod role_claim {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    pub fn serialize<S: Serializer>(roles: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        match roles {
            [single] => single.serialize(serializer),
            many => many.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(role) => vec![role],
            OneOrMany::Many(roles) => roles,
        })
    }
}

/// Refresh token entity stored by the token repository
///
/// Only `is_revoked` and `revoked_at` ever change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique identifier for the refresh token
    pub id: Uuid,

    /// Opaque token value, globally unique
    pub token: String,

    /// User ID this token belongs to
    pub user_id: Uuid,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Timestamp when the token was created
    pub created_at: DateTime<Utc>,

    /// Whether the token has been revoked
    pub is_revoked: bool,

    /// Timestamp when the token was revoked
    pub revoked_at: Option<DateTime<Utc>>,

    /// Client IP address at issuance
    pub ip_address: Option<String>,

    /// Client device description at issuance
    pub device_info: Option<String>,
}

impl RefreshToken {
    /// Creates a new, active refresh token
    ///
    /// # Arguments
    ///
    /// * `user_id` - The owning user's UUID
    /// * `token` - The opaque token value
    /// * `lifetime` - Time until expiry
    /// * `ip_address` - Optional client IP
    /// * `device_info` - Optional client device description
    ///
    /// Timestamps are truncated to microseconds, the precision the
    /// repository stores, so a saved token compares equal to its reloaded
    /// copy.
    pub fn new(
        user_id: Uuid,
        token: String,
        lifetime: Duration,
        ip_address: Option<String>,
        device_info: Option<String>,
    ) -> Self {
        let now = Utc::now().trunc_subsecs(6);
        let expires_at = now
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .trunc_subsecs(6);

        Self {
            id: Uuid::new_v4(),
            token,
            user_id,
            expires_at,
            created_at: now,
            is_revoked: false,
            revoked_at: None,
            ip_address,
            device_info,
        }
    }

    /// Whether the token is past expiry at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Checks if the refresh token has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the token can still be exchanged at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && !self.is_expired_at(now)
    }

    /// Checks if the refresh token is active (not revoked, not expired)
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    /// Revokes the refresh token
    ///
    /// Returns `false` without touching `revoked_at` when already revoked.
    pub fn revoke_at(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_revoked {
            return false;
        }
        self.is_revoked = true;
        self.revoked_at = Some(now);
        true
    }

    /// Gets the time remaining until expiration, or zero if expired
    pub fn time_until_expiration(&self) -> Duration {
        let now = Utc::now();
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Signed JWT access token
    pub access_token: String,

    /// Opaque refresh token
    pub refresh_token: String,

    /// Access token expiry
    pub expires_at: DateTime<Utc>,

    /// Refresh token expiry
    pub refresh_expires_at: DateTime<Utc>,
}
