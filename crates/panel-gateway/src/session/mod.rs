//! Session implementations: password check, token schemes, cookie helpers.

mod cookie;
mod password;
mod tokens;

pub use cookie::{clear_cookie, extract_cookie, session_cookie};
pub use password::StaticPasswordVerifier;
pub use tokens::{MarkerSessionTokens, SignedSessionTokens};

use std::str::FromStr;

/// Which token scheme backs the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// HMAC-signed, expiring tokens.
    #[default]
    Signed,
    /// Legacy fixed `authenticated` marker.
    Marker,
}

impl FromStr for SessionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "signed" => Ok(SessionMode::Signed),
            "marker" => Ok(SessionMode::Marker),
            other => Err(format!("unknown session mode '{other}'")),
        }
    }
}
