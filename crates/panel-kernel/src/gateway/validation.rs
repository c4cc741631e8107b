//! Gateway configuration container and startup validation.
//!
//! [`GatewayConfig`] aggregates the raw per-upstream settings read at startup
//! and exposes [`validate()`](GatewayConfig::validate), which checks every
//! structural invariant before any runtime resource is allocated, and
//! [`slots()`](GatewayConfig::slots), which turns the settings into registry
//! entries.
//!
//! A base URL that is *absent* is not a validation failure: the service is
//! recorded as [`UpstreamSlot::Unconfigured`] and every call that resolves it
//! reports the missing variable. A base URL that is *present but malformed*
//! is a validation failure.

use super::error::GatewayError;
use super::upstream::{HeaderPolicy, ServiceId, UpstreamDescriptor, UpstreamSlot};
use std::collections::HashSet;

// ─────────────────────────────────────────────────────────────────────────────
// UpstreamConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Raw settings for one upstream, as read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    pub service: ServiceId,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub policy: HeaderPolicy,
}

impl UpstreamConfig {
    /// Settings with no URL or key and the service's default policy.
    pub fn new(service: ServiceId) -> Self {
        Self {
            service,
            base_url: None,
            api_key: None,
            policy: service.default_policy(),
        }
    }

    /// Builder: set the base URL. Blank values count as absent.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into()).filter(|u| !u.trim().is_empty());
        self
    }

    /// Builder: set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Builder: override the header policy.
    pub fn with_policy(mut self, policy: HeaderPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn slot(&self) -> Result<UpstreamSlot, GatewayError> {
        match &self.base_url {
            None => Ok(UpstreamSlot::Unconfigured(self.service)),
            Some(raw) => Ok(UpstreamSlot::Configured(
                UpstreamDescriptor::parse(self.service, raw)?
                    .with_api_key(self.api_key.clone())
                    .with_policy(self.policy),
            )),
        }
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("service", &self.service)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("policy", &self.policy)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GatewayConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level upstream configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Per-service settings.
    pub upstreams: Vec<UpstreamConfig>,
    /// Bound applied to every upstream call, in milliseconds (must be > 0).
    pub upstream_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            upstreams: Vec::new(),
            upstream_timeout_ms: 10_000,
        }
    }
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add an upstream.
    pub fn with_upstream(mut self, upstream: UpstreamConfig) -> Self {
        self.upstreams.push(upstream);
        self
    }

    /// Builder: set the per-call upstream timeout.
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.upstream_timeout_ms = ms;
        self
    }

    /// Validate all structural invariants of this configuration.
    ///
    /// Checks performed (in order):
    /// 1. `upstream_timeout_ms` is non-zero.
    /// 2. No service appears twice.
    /// 3. Every base URL that is present parses as an http(s) URL.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.upstream_timeout_ms == 0 {
            return Err(GatewayError::InvalidTimeout);
        }

        let mut seen: HashSet<ServiceId> = HashSet::new();
        for upstream in &self.upstreams {
            if !seen.insert(upstream.service) {
                return Err(GatewayError::DuplicateService(
                    upstream.service.as_str().to_string(),
                ));
            }
            upstream.slot()?;
        }
        Ok(())
    }

    /// Registry entries for every known service, in [`ServiceId::ALL`] order.
    ///
    /// Services with no settings at all are reported as unconfigured.
    pub fn slots(&self) -> Result<Vec<UpstreamSlot>, GatewayError> {
        self.validate()?;
        ServiceId::ALL
            .iter()
            .map(|id| {
                self.upstreams
                    .iter()
                    .find(|u| u.service == *id)
                    .map_or(Ok(UpstreamSlot::Unconfigured(*id)), UpstreamConfig::slot)
            })
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
