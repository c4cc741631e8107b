//! Upstream service registry: kernel contract.
//!
//! The [`UpstreamRegistry`] trait is the single kernel-level abstraction for
//! resolving a logical service identifier to the base URL and credentials
//! the gateway forwards to. The set of services is closed ([`ServiceId`]);
//! the registry is populated once at startup and is read-only afterwards.

use super::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

// ─────────────────────────────────────────────────────────────────────────────
// Service identity
// ─────────────────────────────────────────────────────────────────────────────

/// Logical identifier of an upstream service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceId {
    /// Owner of the shared key/value variable store.
    SharedVariables,
    /// Plan controller; only exposes health through this gateway.
    PlanController,
}

impl ServiceId {
    /// Every known service, in display order.
    pub const ALL: [ServiceId; 2] = [ServiceId::SharedVariables, ServiceId::PlanController];

    /// Identifier used in query strings (`?service=shared-variables`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::SharedVariables => "shared-variables",
            ServiceId::PlanController => "plan-controller",
        }
    }

    /// Human-readable service name used in error payloads and snapshots.
    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceId::SharedVariables => "shared-variables-service",
            ServiceId::PlanController => "plan-controller-service",
        }
    }

    /// Environment variable holding the base URL.
    pub fn url_env_var(&self) -> &'static str {
        match self {
            ServiceId::SharedVariables => "SHARED_VARIABLES_SERVICE_URL",
            ServiceId::PlanController => "PLAN_CONTROLLER_SERVICE_URL",
        }
    }

    /// Environment variable holding the API key.
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            ServiceId::SharedVariables => "SHARED_VARIABLES_SERVICE_API_KEY",
            ServiceId::PlanController => "PLAN_CONTROLLER_SERVICE_API_KEY",
        }
    }

    /// Default header policy for this service.
    pub fn default_policy(&self) -> HeaderPolicy {
        match self {
            ServiceId::SharedVariables => HeaderPolicy {
                api_key_on_data: true,
                api_key_on_health: true,
            },
            ServiceId::PlanController => HeaderPolicy {
                api_key_on_data: true,
                api_key_on_health: false,
            },
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceId {
    type Err = GatewayError;

    /// Exact match only; unknown identifiers are never defaulted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shared-variables" => Ok(ServiceId::SharedVariables),
            "plan-controller" => Ok(ServiceId::PlanController),
            other => Err(GatewayError::UnknownService(other.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Header policy
// ─────────────────────────────────────────────────────────────────────────────

/// Category of an upstream call, used to look up the header policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Health probe (`GET {base}/health`).
    Health,
    /// Variable reads and writes.
    Data,
}

/// Which call kinds carry the `x-api-key` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderPolicy {
    pub api_key_on_data: bool,
    pub api_key_on_health: bool,
}

impl HeaderPolicy {
    pub fn requires_api_key(&self, kind: CallKind) -> bool {
        match kind {
            CallKind::Health => self.api_key_on_health,
            CallKind::Data => self.api_key_on_data,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UpstreamDescriptor
// ─────────────────────────────────────────────────────────────────────────────

/// Resolved description of one upstream service.
///
/// Immutable once built. The API key is kept out of the `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamDescriptor {
    pub id: ServiceId,
    pub base_url: Url,
    pub api_key: Option<String>,
    pub policy: HeaderPolicy,
}

impl UpstreamDescriptor {
    /// Construct a descriptor with the service's default header policy.
    pub fn new(id: ServiceId, base_url: Url) -> Self {
        Self {
            id,
            base_url,
            api_key: None,
            policy: id.default_policy(),
        }
    }

    /// Parse `raw` as the base URL for `id`.
    ///
    /// Only `http` and `https` URLs are accepted.
    pub fn parse(id: ServiceId, raw: &str) -> Result<Self, GatewayError> {
        let invalid = |reason: String| GatewayError::InvalidBaseUrl {
            service: id.display_name(),
            env_var: id.url_env_var(),
            reason,
        };
        let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid(format!("scheme '{}' is not http or https", url.scheme())));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot be used as a base".to_string()));
        }
        Ok(Self::new(id, url))
    }

    /// Builder: attach the API key. Blank keys are treated as absent.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    /// Builder: override the header policy.
    pub fn with_policy(mut self, policy: HeaderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the absolute URL for `segments` under the base URL.
    ///
    /// Each segment is percent-encoded as a single path segment, so a
    /// variable name containing `/` or `?` cannot change the target path.
    /// The dot segments `.` and `..` are still collapsed by URL
    /// normalization; callers reject them before building the URL.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// API key to attach for `kind`.
    ///
    /// `Ok(None)` means no header is sent. A data call whose policy requires
    /// a key that is not configured is a configuration error; a health call
    /// in the same situation is sent without the header.
    pub fn api_key_for(&self, kind: CallKind) -> Result<Option<&str>, GatewayError> {
        if !self.policy.requires_api_key(kind) {
            return Ok(None);
        }
        match (self.api_key.as_deref(), kind) {
            (Some(key), _) => Ok(Some(key)),
            (None, CallKind::Health) => Ok(None),
            (None, CallKind::Data) => Err(GatewayError::MissingApiKey {
                service: self.id.display_name(),
                env_var: self.id.api_key_env_var(),
            }),
        }
    }
}

impl fmt::Debug for UpstreamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamDescriptor")
            .field("id", &self.id)
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("policy", &self.policy)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UpstreamRegistry trait
// ─────────────────────────────────────────────────────────────────────────────

/// Registry entry: either a usable descriptor or a record of what is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamSlot {
    Configured(UpstreamDescriptor),
    /// The base URL environment variable was absent at startup.
    Unconfigured(ServiceId),
}

impl UpstreamSlot {
    pub fn service(&self) -> ServiceId {
        match self {
            UpstreamSlot::Configured(d) => d.id,
            UpstreamSlot::Unconfigured(id) => *id,
        }
    }
}

/// Kernel contract for the upstream registry.
///
/// Implementations are populated at startup and shared read-only across
/// request handlers, so no method takes `&mut self`.
pub trait UpstreamRegistry: Send + Sync {
    /// Resolve a service to its descriptor.
    ///
    /// Returns [`GatewayError::MissingBaseUrl`] when the service is known but
    /// was not configured.
    fn resolve(&self, id: ServiceId) -> Result<&UpstreamDescriptor, GatewayError>;

    /// Every service slot, configured or not, in [`ServiceId::ALL`] order.
    fn slots(&self) -> Vec<&UpstreamSlot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(url: &str) -> UpstreamDescriptor {
        UpstreamDescriptor::parse(ServiceId::SharedVariables, url).unwrap()
    }

    #[test]
    fn service_id_parses_known_values_only() {
        assert_eq!(
            "shared-variables".parse::<ServiceId>(),
            Ok(ServiceId::SharedVariables)
        );
        assert_eq!(
            "plan-controller".parse::<ServiceId>(),
            Ok(ServiceId::PlanController)
        );
        assert_eq!(
            "Plan-Controller".parse::<ServiceId>(),
            Err(GatewayError::UnknownService("Plan-Controller".to_string()))
        );
        assert!("".parse::<ServiceId>().is_err());
    }

    #[test]
    fn endpoint_appends_segments_and_keeps_prefix() {
        let d = shared("http://vars.internal:8080/api/");
        assert_eq!(
            d.endpoint(&["variables", "X"]).as_str(),
            "http://vars.internal:8080/api/variables/X"
        );

        let d = shared("http://vars.internal");
        assert_eq!(d.endpoint(&["health"]).as_str(), "http://vars.internal/health");
    }

    #[test]
    fn endpoint_encodes_name_as_single_segment() {
        let d = shared("http://vars.internal");
        assert_eq!(
            d.endpoint(&["variables", "a/b?c"]).as_str(),
            "http://vars.internal/variables/a%2Fb%3Fc"
        );
    }

    #[test]
    fn parse_rejects_non_http_urls() {
        assert!(matches!(
            UpstreamDescriptor::parse(ServiceId::PlanController, "ftp://x"),
            Err(GatewayError::InvalidBaseUrl { service: "plan-controller-service", .. })
        ));
        assert!(UpstreamDescriptor::parse(ServiceId::PlanController, "not a url").is_err());
    }

    #[test]
    fn health_key_policy_differs_per_service() {
        let sv = shared("http://sv").with_api_key(Some("k1".into()));
        assert_eq!(sv.api_key_for(CallKind::Health), Ok(Some("k1")));

        let pc = UpstreamDescriptor::parse(ServiceId::PlanController, "http://pc")
            .unwrap()
            .with_api_key(Some("k2".into()));
        assert_eq!(pc.api_key_for(CallKind::Health), Ok(None));
        assert_eq!(pc.api_key_for(CallKind::Data), Ok(Some("k2")));
    }

    #[test]
    fn missing_key_is_error_for_data_only() {
        let sv = shared("http://sv").with_api_key(Some("   ".into()));
        assert_eq!(sv.api_key_for(CallKind::Health), Ok(None));
        let err = sv.api_key_for(CallKind::Data).unwrap_err();
        assert_eq!(
            err.to_string(),
            "shared-variables-service API key not configured (SHARED_VARIABLES_SERVICE_API_KEY)"
        );
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let sv = shared("http://sv").with_api_key(Some("super-secret".into()));
        let dbg = format!("{sv:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
