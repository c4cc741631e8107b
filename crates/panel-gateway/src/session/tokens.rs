//! Session token schemes.
//!
//! [`SignedSessionTokens`] is the default: the cookie value is
//! `<expires_unix>.<signature>` where the signature is an HMAC-SHA256 over
//! the expiry, base64url-encoded without padding. Forging or extending a
//! session requires the signing key.
//!
//! [`MarkerSessionTokens`] reproduces the legacy scheme in which the cookie
//! value is the fixed string `authenticated`. Anyone who knows the string can
//! forge it; it exists only for deployments that still depend on it.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac, digest::InvalidLength};
use panel_kernel::session::{SessionClaims, SessionError, SessionToken, SessionTokens, session_ttl};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Value of every legacy marker cookie.
const SESSION_MARKER: &str = "authenticated";

// ─────────────────────────────────────────────────────────────────────────────
// Signed tokens
// ─────────────────────────────────────────────────────────────────────────────

pub struct SignedSessionTokens {
    mac: HmacSha256,
}

impl SignedSessionTokens {
    pub fn new(key: &[u8]) -> Result<Self, InvalidLength> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(key)?,
        })
    }

    /// Tokens signed with a fresh random key; sessions do not survive a
    /// restart.
    pub fn random() -> Result<Self, InvalidLength> {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self::new(&key)
    }

    fn sign(&self, expires: i64) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(expires.to_string().as_bytes());
        mac
    }
}

impl SessionTokens for SignedSessionTokens {
    fn issue(&self, now: DateTime<Utc>) -> SessionToken {
        let expires = (now + session_ttl()).timestamp();
        let signature = URL_SAFE_NO_PAD.encode(self.sign(expires).finalize().into_bytes());
        SessionToken {
            value: format!("{expires}.{signature}"),
            expires_at: DateTime::from_timestamp(expires, 0).unwrap_or(now + session_ttl()),
        }
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, SessionError> {
        let (expires, signature) = token.split_once('.').ok_or(SessionError::Malformed)?;
        let expires: i64 = expires.parse().map_err(|_| SessionError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SessionError::Malformed)?;

        self.sign(expires)
            .verify_slice(&signature)
            .map_err(|_| SessionError::BadSignature)?;

        let expires_at = DateTime::from_timestamp(expires, 0).ok_or(SessionError::Malformed)?;
        if expires_at <= now {
            return Err(SessionError::Expired(expires_at));
        }
        Ok(SessionClaims {
            expires_at: Some(expires_at),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Legacy marker
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MarkerSessionTokens;

impl SessionTokens for MarkerSessionTokens {
    fn issue(&self, now: DateTime<Utc>) -> SessionToken {
        SessionToken {
            value: SESSION_MARKER.to_string(),
            expires_at: now + session_ttl(),
        }
    }

    fn verify(&self, token: &str, _now: DateTime<Utc>) -> Result<SessionClaims, SessionError> {
        if bool::from(token.as_bytes().ct_eq(SESSION_MARKER.as_bytes())) {
            Ok(SessionClaims { expires_at: None })
        } else {
            Err(SessionError::Malformed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_800_000_000, 0).unwrap()
    }

    #[test]
    fn issued_token_verifies_until_expiry() {
        let tokens = SignedSessionTokens::new(b"test-key").unwrap();
        let token = tokens.issue(now());
        assert_eq!(token.expires_at, now() + Duration::days(1));

        let claims = tokens.verify(&token.value, now() + Duration::hours(23)).unwrap();
        assert_eq!(claims.expires_at, Some(token.expires_at));

        assert_eq!(
            tokens.verify(&token.value, now() + Duration::days(1)),
            Err(SessionError::Expired(token.expires_at))
        );
    }

    #[test]
    fn tampered_expiry_is_rejected() {
        let tokens = SignedSessionTokens::new(b"test-key").unwrap();
        let token = tokens.issue(now());
        let (_, sig) = token.value.split_once('.').unwrap();
        let forged = format!("{}.{sig}", token.expires_at.timestamp() + 3600);
        assert_eq!(tokens.verify(&forged, now()), Err(SessionError::BadSignature));
    }

    #[test]
    fn other_key_is_rejected() {
        let a = SignedSessionTokens::new(b"key-a").unwrap();
        let b = SignedSessionTokens::new(b"key-b").unwrap();
        let token = a.issue(now());
        assert_eq!(b.verify(&token.value, now()), Err(SessionError::BadSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let tokens = SignedSessionTokens::random().unwrap();
        for bad in ["", "authenticated", "abc.def", "123.!!!", "."] {
            assert!(tokens.verify(bad, now()).is_err(), "{bad:?}");
        }
        assert_eq!(tokens.verify("authenticated", now()), Err(SessionError::Malformed));
    }

    #[test]
    fn marker_accepts_only_the_literal() {
        let tokens = MarkerSessionTokens;
        assert_eq!(tokens.issue(now()).value, "authenticated");
        assert!(tokens.verify("authenticated", now()).is_ok());
        assert!(tokens.verify("Authenticated", now()).is_err());
        assert!(tokens.verify("", now()).is_err());
    }
}
