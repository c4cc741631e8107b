//! Gateway error types for `panel-kernel`.
//!
//! [`GatewayError`] covers every failure mode that can be detected from
//! configuration alone (unknown service identifiers, bad base URLs, absent
//! credentials) before any network I/O occurs. Runtime
//! failures (connection refused, upstream timeout, …) belong in the gateway
//! implementation crate (`panel-gateway`).
//!
//! Messages name the service and the environment variable involved. They
//! never carry secret values.

use thiserror::Error;

/// Configuration error type for the gateway kernel contract.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum GatewayError {
    // ── Services ────────────────────────────────────────────────────────────
    /// The service identifier is not one of the known upstreams.
    #[error("unknown service '{0}'")]
    UnknownService(String),

    /// A descriptor for this service has already been registered.
    #[error("service '{0}' is already registered")]
    DuplicateService(String),

    // ── Base URLs ────────────────────────────────────────────────────────────
    /// The service is known but its base URL was never configured.
    #[error("{service} URL not configured ({env_var})")]
    MissingBaseUrl {
        service: &'static str,
        env_var: &'static str,
    },

    /// The configured base URL could not be parsed or is not http(s).
    #[error("{service} has an invalid base URL in {env_var}: {reason}")]
    InvalidBaseUrl {
        service: &'static str,
        env_var: &'static str,
        reason: String,
    },

    // ── Credentials ─────────────────────────────────────────────────────────
    /// The call policy requires an API key that is not configured.
    #[error("{service} API key not configured ({env_var})")]
    MissingApiKey {
        service: &'static str,
        env_var: &'static str,
    },

    /// No admin password is configured, so no login can succeed.
    #[error("Admin password not configured ({0})")]
    MissingAdminPassword(&'static str),

    // ── Timeouts ─────────────────────────────────────────────────────────────
    /// `upstream_timeout_ms` is zero, which would fail every upstream call.
    #[error("upstream timeout must be greater than 0 ms")]
    InvalidTimeout,
}

impl GatewayError {
    /// Name of the service this error concerns, when there is one.
    pub fn service(&self) -> Option<&'static str> {
        match self {
            GatewayError::MissingBaseUrl { service, .. }
            | GatewayError::InvalidBaseUrl { service, .. }
            | GatewayError::MissingApiKey { service, .. } => Some(*service),
            _ => None,
        }
    }
}
