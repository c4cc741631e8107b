//! Core data types for the gateway kernel contract.
//!
//! These types are shared by the filter chain
//! ([`GatewayFilter`](super::filter::GatewayFilter)) and the proxy runtime,
//! and carry no runtime dependencies beyond `serde` and `std`.

use super::upstream::ServiceId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────────────────────────────────────
// HTTP primitives
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP method, covering the verbs the gateway accepts or forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    /// Any other method. Carried through the filter chain, never forwarded.
    Other,
}

impl HttpMethod {
    /// Case-insensitive parse; unknown verbs become [`HttpMethod::Other`].
    pub fn from_str_or_other(s: &str) -> Self {
        Self::from_str_ci(s).unwrap_or(HttpMethod::Other)
    }

    /// Case-insensitive parse from a string slice.
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            "HEAD" => Some(HttpMethod::Head),
            "OPTIONS" => Some(HttpMethod::Options),
            _ => None,
        }
    }

    /// Return the standard uppercase string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Other => "OTHER",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request / Response
// ─────────────────────────────────────────────────────────────────────────────

/// An inbound request as seen by the filter chain.
///
/// Only the request line and headers are captured; bodies are parsed by the
/// handlers after the chain has let the request through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayRequest {
    /// Unique identifier for correlating this request across logs.
    pub id: String,
    /// Request path, e.g. `/variables/feature_flag`.
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// HTTP headers (header names are lowercased).
    pub headers: HashMap<String, String>,
}

impl GatewayRequest {
    /// Construct a minimal request with the given id, path, and method.
    pub fn new(id: impl Into<String>, path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            method,
            headers: HashMap::new(),
        }
    }

    /// Builder helper: attach a header.
    ///
    /// A repeated `Cookie` header is joined to the earlier one with `; `;
    /// any other repeated header replaces the earlier value.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into().to_lowercase();
        let value = value.into();
        if key == "cookie" {
            if let Some(existing) = self.headers.get_mut(&key) {
                existing.push_str("; ");
                existing.push_str(&value);
                return self;
            }
        }
        self.headers.insert(key, value);
        self
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }
}

/// Summary of the response returned to the client, handed to filters on
/// the response path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponse {
    /// HTTP status code (100–599).
    pub status: u16,
    /// Upstream service that produced the response, if any was called.
    pub service: Option<ServiceId>,
    /// Time spent inside the gateway in milliseconds.
    pub latency_ms: u64,
}

impl GatewayResponse {
    /// Construct a minimal response.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            service: None,
            latency_ms: 0,
        }
    }

    /// Builder helper: record the upstream service.
    pub fn with_service(mut self, service: Option<ServiceId>) -> Self {
        self.service = service;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request context
// ─────────────────────────────────────────────────────────────────────────────

/// Mutable context that flows through the filter chain for a single request.
///
/// Filters read from and write to this context, so the session decision made
/// by the auth filter is visible to the access logger.
#[derive(Debug, Clone)]
pub struct GatewayContext {
    /// The inbound request.
    pub request: GatewayRequest,
    /// Set by the session filter once the request carries a valid session.
    pub authenticated: bool,
    /// Free-form attributes written and read by filters.
    pub attributes: HashMap<String, serde_json::Value>,
}

impl GatewayContext {
    /// Create a fresh context from an inbound request.
    pub fn new(request: GatewayRequest) -> Self {
        Self {
            request,
            authenticated: false,
            attributes: HashMap::new(),
        }
    }

    /// Convenience: read a typed attribute, returning `None` if absent or
    /// if deserialization fails.
    pub fn get_attr<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Convenience: write a serializable attribute.
    pub fn set_attr<T: serde::Serialize>(&mut self, key: impl Into<String>, val: &T) {
        if let Ok(v) = serde_json::to_value(val) {
            self.attributes.insert(key.into(), v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_methods_parse_as_other() {
        assert_eq!(HttpMethod::from_str_or_other("put"), HttpMethod::Put);
        assert_eq!(HttpMethod::from_str_or_other("TRACE"), HttpMethod::Other);
        assert_eq!(HttpMethod::from_str_ci("TRACE"), None);
    }

    #[test]
    fn repeated_cookie_headers_are_joined() {
        let req = GatewayRequest::new("r", "/variables", HttpMethod::Get)
            .with_header("Cookie", "theme=dark")
            .with_header("cookie", "auth_token=abc")
            .with_header("Accept", "text/html")
            .with_header("accept", "application/json");
        assert_eq!(req.header("cookie"), Some("theme=dark; auth_token=abc"));
        assert_eq!(req.header("Accept"), Some("application/json"));
    }
}
