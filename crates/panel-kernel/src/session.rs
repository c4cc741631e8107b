//! Session and credential contracts.
//!
//! Two capabilities are kept apart so that stronger schemes can replace
//! either without touching call sites:
//!
//! - [`CredentialVerifier`] decides whether a login attempt is accepted.
//! - [`SessionTokens`] issues the opaque token stored in the session cookie
//!   and later decides whether a presented token still authorizes requests.
//!
//! A token carries no identity, only the capability "is an authenticated
//! operator" until `expires_at`.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE: &str = "auth_token";

/// Fixed lifetime of a session in seconds: one day.
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// [`SESSION_TTL_SECS`] as a [`Duration`].
pub fn session_ttl() -> Duration {
    Duration::seconds(SESSION_TTL_SECS)
}

/// Verifies login credentials.
pub trait CredentialVerifier: Send + Sync {
    /// `true` when `presented` is an acceptable credential.
    fn verify(&self, presented: &str) -> bool;

    /// `false` when no credential is configured and every login must fail.
    fn is_configured(&self) -> bool {
        true
    }
}

/// A freshly issued session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionToken {
    /// Opaque cookie value.
    #[serde(skip)]
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// What a valid token asserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionClaims {
    /// `None` when the token itself carries no expiry and the cookie's
    /// lifetime is the only bound.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Reasons a presented token is not accepted.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session token is malformed")]
    Malformed,
    #[error("session token signature does not match")]
    BadSignature,
    #[error("session token expired at {0}")]
    Expired(DateTime<Utc>),
}

/// Issues and verifies session tokens.
pub trait SessionTokens: Send + Sync {
    /// Create a token valid from `now` for [`session_ttl()`].
    fn issue(&self, now: DateTime<Utc>) -> SessionToken;

    /// Check a token presented at `now`.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, SessionError>;
}
