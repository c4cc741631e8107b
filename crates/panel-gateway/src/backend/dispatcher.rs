//! Upstream request dispatcher.
//!
//! [`ProxyDispatcher`] turns a logical call (service, call kind, method,
//! path segments, optional JSON body) into exactly one HTTP request and
//! returns the upstream status and body untouched. Non-success statuses are
//! not errors here: they come back as an ordinary [`UpstreamReply`] so the
//! handler can relay them verbatim.
//!
//! Only transport-level failures become [`PanelError`]s:
//!
//! | Failure | Error |
//! |---------|-------|
//! | service not configured, data key missing | [`PanelError::Config`] |
//! | connect failure, timeout, truncated body | [`PanelError::Network`] |
//! | body present but not JSON | [`PanelError::MalformedUpstream`] |

use crate::error::{PanelError, PanelResult};
use axum::{
    body::Bytes,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use panel_kernel::gateway::{CallKind, HttpMethod, ServiceId, UpstreamRegistry};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Header carrying the per-service API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Status and body of an upstream response.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub service: ServiceId,
    pub status: u16,
    /// `None` when the upstream sent an empty body.
    pub body: Option<Value>,
    /// Body bytes as received, relayed to the client unchanged.
    pub raw: Bytes,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl IntoResponse for UpstreamReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        let mut response = match self.body {
            Some(_) => {
                (status, [(header::CONTENT_TYPE, "application/json")], self.raw).into_response()
            }
            None => status.into_response(),
        };
        response.extensions_mut().insert(self.service);
        response
    }
}

/// Forwards calls to the upstreams held by an [`UpstreamRegistry`].
pub struct ProxyDispatcher {
    registry: Arc<dyn UpstreamRegistry>,
    client: Client,
    timeout: Duration,
}

impl ProxyDispatcher {
    /// Build a dispatcher whose every call is bounded by `timeout`.
    pub fn new(registry: Arc<dyn UpstreamRegistry>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            registry,
            client,
            timeout,
        })
    }

    pub fn registry(&self) -> &dyn UpstreamRegistry {
        self.registry.as_ref()
    }

    /// Send one request to `service` at `{base}/{segments...}`.
    ///
    /// Each segment is percent-encoded as a single path segment. The
    /// `x-api-key` header is attached according to the service's header
    /// policy for `kind`.
    #[instrument(skip_all, fields(service = %service, kind = ?kind, method = method.as_str()))]
    pub async fn forward(
        &self,
        service: ServiceId,
        kind: CallKind,
        method: HttpMethod,
        segments: &[&str],
        body: Option<&Value>,
    ) -> PanelResult<UpstreamReply> {
        let descriptor = self.registry.resolve(service)?;
        let api_key = descriptor.api_key_for(kind)?;
        if api_key.is_none() && descriptor.policy.requires_api_key(kind) {
            warn!(
                env_var = service.api_key_env_var(),
                "API key not configured; probing without it"
            );
        }

        let url = descriptor.endpoint(segments);
        debug!(url = %url, "forwarding to upstream");

        let mut builder = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Put => self.client.put(url),
            HttpMethod::Patch => self.client.patch(url),
            HttpMethod::Delete => self.client.delete(url),
            HttpMethod::Head => self.client.head(url),
            _ => self.client.request(reqwest::Method::OPTIONS, url),
        };
        builder = builder.header(reqwest::header::ACCEPT, "application/json");
        if let Some(key) = api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| self.network_error(service, e))?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.network_error(service, e))?;

        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(status, latency_ms, bytes = bytes.len(), "upstream replied");

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            let value = serde_json::from_slice::<Value>(&bytes).map_err(|e| {
                warn!(status, error = %e, "upstream body is not JSON");
                PanelError::MalformedUpstream {
                    service,
                    message: e.to_string(),
                }
            })?;
            Some(value)
        };

        Ok(UpstreamReply {
            service,
            status,
            body,
            raw: bytes,
        })
    }

    fn network_error(&self, service: ServiceId, err: reqwest::Error) -> PanelError {
        let message = if err.is_timeout() {
            format!("request timed out after {} ms", self.timeout.as_millis())
        } else {
            error_chain(&err)
        };
        warn!(service = %service, error = %message, "upstream call failed");
        PanelError::Network { service, message }
    }
}

/// `err` followed by its sources, separated by `: `.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
