//! Single shared admin password.

use panel_kernel::session::CredentialVerifier;
use subtle::ConstantTimeEq;

/// Accepts exactly one password, compared in constant time.
///
/// With no password configured every attempt is refused.
pub struct StaticPasswordVerifier {
    password: Option<String>,
}

impl StaticPasswordVerifier {
    pub fn new(password: Option<String>) -> Self {
        Self {
            password: password.filter(|p| !p.is_empty()),
        }
    }
}

impl CredentialVerifier for StaticPasswordVerifier {
    fn verify(&self, presented: &str) -> bool {
        match &self.password {
            Some(expected) => expected.as_bytes().ct_eq(presented.as_bytes()).into(),
            None => false,
        }
    }

    fn is_configured(&self) -> bool {
        self.password.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_the_configured_password() {
        let v = StaticPasswordVerifier::new(Some("hunter2".into()));
        assert!(v.verify("hunter2"));
        assert!(!v.verify("hunter"));
        assert!(!v.verify("hunter22"));
        assert!(!v.verify(""));
    }

    #[test]
    fn unconfigured_refuses_everything() {
        let v = StaticPasswordVerifier::new(Some(String::new()));
        assert!(!v.is_configured());
        assert!(!v.verify(""));
    }
}
