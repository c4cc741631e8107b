//! Axum-based HTTP gateway server.
//!
//! [`GatewayServer`] wires together the upstream registry, dispatcher,
//! session scheme, and filter pipeline into a running axum service.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/auth/login` | Exchange the admin password for a session cookie. |
//! | `POST` | `/auth/logout` | Clear the session cookie. |
//! | `GET`  | `/auth/session` | Report session state. |
//! | `GET`  | `/health?service={id}` | Relay one upstream's health report. |
//! | `GET`  | `/health/summary` | Normalized health of every upstream. |
//! | `GET`, `POST`, `PUT` | `/variables` | List, create, update-by-body. |
//! | `GET`, `PUT` | `/variables/{name}` | Fetch or update one variable. |
//! | `GET`  | `/variables/{name}/draft` | Editable text of one value. |
//!
//! Every path except `/auth/*` requires a session. The check wraps every
//! route and the fallback, so an unauthenticated request is refused whatever
//! its path.

use crate::backend::{InMemoryUpstreamRegistry, ProxyDispatcher};
use crate::error::{PanelError, StartupError};
use crate::filter::{FilterPipeline, LoggingFilter, SessionFilter};
use crate::handlers::{auth_router, health_router, variables_router};
use crate::health::HealthAggregator;
use crate::session::{
    MarkerSessionTokens, SessionMode, SignedSessionTokens, StaticPasswordVerifier,
};
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use panel_kernel::gateway::{
    FilterAction, GatewayConfig, GatewayContext, GatewayFilter, GatewayRequest, GatewayResponse,
    HttpMethod, ServiceId, UpstreamConfig,
};
use panel_kernel::session::{CredentialVerifier, SessionTokens};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// GatewayServerConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Runtime configuration for [`GatewayServer`].
#[derive(Clone)]
pub struct GatewayServerConfig {
    /// Address to bind (default: `0.0.0.0`).
    pub bind: String,
    /// TCP port to listen on (default: 3000).
    pub port: u16,
    /// Upstream settings and call timeout.
    pub gateway: GatewayConfig,
    /// Shared admin password. When absent every login fails.
    pub admin_password: Option<String>,
    /// Token scheme behind the session cookie.
    pub session_mode: SessionMode,
    /// HMAC key for signed sessions; random per process when absent.
    pub session_signing_key: Option<String>,
    /// Add `Secure` to the session cookie.
    pub cookie_secure: bool,
}

impl Default for GatewayServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            gateway: GatewayConfig::default(),
            admin_password: None,
            session_mode: SessionMode::default(),
            session_signing_key: None,
            cookie_secure: false,
        }
    }
}

impl GatewayServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let mut gateway = GatewayConfig::new();
        if let Some(ms) = var("UPSTREAM_TIMEOUT_MS") {
            match ms.trim().parse() {
                Ok(ms) => gateway = gateway.with_timeout_ms(ms),
                Err(_) => warn!(value = %ms, "ignoring invalid UPSTREAM_TIMEOUT_MS"),
            }
        }
        for service in ServiceId::ALL {
            let mut upstream = UpstreamConfig::new(service);
            if let Some(url) = var(service.url_env_var()) {
                upstream = upstream.with_base_url(url);
            }
            if let Some(key) = var(service.api_key_env_var()) {
                upstream = upstream.with_api_key(key);
            }
            gateway = gateway.with_upstream(upstream);
        }

        let session_mode = match var("SESSION_MODE").map(|m| m.parse::<SessionMode>()) {
            None => SessionMode::default(),
            Some(Ok(mode)) => mode,
            Some(Err(e)) => {
                warn!(error = %e, "falling back to signed sessions");
                SessionMode::default()
            }
        };

        Self {
            bind: var("GATEWAY_BIND").unwrap_or(defaults.bind),
            port: var("GATEWAY_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
            gateway,
            admin_password: var("ADMIN_PASSWORD"),
            session_mode,
            session_signing_key: var("SESSION_SIGNING_KEY"),
            cookie_secure: var("COOKIE_SECURE")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}

impl std::fmt::Debug for GatewayServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayServerConfig")
            .field("bind", &self.bind)
            .field("port", &self.port)
            .field("gateway", &self.gateway)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("session_mode", &self.session_mode)
            .field(
                "session_signing_key",
                &self.session_signing_key.as_ref().map(|_| "<redacted>"),
            )
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GatewayServer
// ─────────────────────────────────────────────────────────────────────────────

pub struct GatewayServer {
    config: GatewayServerConfig,
}

impl GatewayServer {
    pub fn new(config: GatewayServerConfig) -> Self {
        Self { config }
    }

    /// Build the axum [`Router`].
    ///
    /// Validates the upstream configuration, builds the registry and the
    /// filter pipeline, and selects the session scheme. Call
    /// [`start()`](Self::start) to bind and serve.
    pub fn build_app(&self) -> Result<Router, StartupError> {
        let registry = InMemoryUpstreamRegistry::from_config(&self.config.gateway)?;
        for service in registry.unconfigured() {
            warn!(
                service = service.display_name(),
                env_var = service.url_env_var(),
                "upstream URL not configured; calls to it will fail"
            );
        }

        let timeout = Duration::from_millis(self.config.gateway.upstream_timeout_ms);
        let dispatcher = Arc::new(ProxyDispatcher::new(Arc::new(registry), timeout)?);

        let sessions: Arc<dyn SessionTokens> = match self.config.session_mode {
            SessionMode::Marker => {
                warn!("SESSION_MODE=marker: session cookies are not signed");
                Arc::new(MarkerSessionTokens)
            }
            SessionMode::Signed => {
                let tokens = match &self.config.session_signing_key {
                    Some(key) => SignedSessionTokens::new(key.as_bytes()),
                    None => {
                        info!("SESSION_SIGNING_KEY not set; sessions end on restart");
                        SignedSessionTokens::random()
                    }
                };
                Arc::new(tokens.map_err(|e| StartupError::SessionKey(e.to_string()))?)
            }
        };

        let verifier: Arc<dyn CredentialVerifier> =
            Arc::new(StaticPasswordVerifier::new(self.config.admin_password.clone()));
        if !verifier.is_configured() {
            warn!("ADMIN_PASSWORD not set; every login will be refused");
        }

        let filters: Vec<Arc<dyn GatewayFilter>> = vec![
            Arc::new(LoggingFilter::new()),
            Arc::new(SessionFilter::new(sessions.clone())),
        ];

        let pipeline = FilterPipeline::new(filters);
        debug!(filters = ?pipeline.names(), "filter pipeline assembled");

        let state = AppState {
            health: Arc::new(HealthAggregator::new(dispatcher.clone())),
            dispatcher,
            pipeline: Arc::new(pipeline),
            verifier,
            sessions,
            cookie_secure: self.config.cookie_secure,
        };

        Ok(Router::new()
            .merge(auth_router())
            .merge(health_router())
            .merge(variables_router())
            .fallback(not_found)
            .layer(middleware::from_fn_with_state(state.clone(), run_filters))
            .layer(TraceLayer::new_for_http())
            .with_state(state))
    }

    /// Bind to `{bind}:{port}` and serve until the process exits.
    pub async fn start(self) -> Result<(), StartupError> {
        let app = self.build_app()?;
        let addr = format!("{}:{}", self.config.bind, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(addr = %addr, "panel gateway listening");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Filter middleware
// ─────────────────────────────────────────────────────────────────────────────

/// Run the filter pipeline around the routed handler.
async fn run_filters(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = HttpMethod::from_str_or_other(req.method().as_str());
    let mut gateway_req = GatewayRequest::new(Uuid::new_v4().to_string(), req.uri().path(), method);
    for (name, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            gateway_req = gateway_req.with_header(name.as_str(), v);
        }
    }

    let mut ctx = GatewayContext::new(gateway_req);
    if let FilterAction::Reject(status, message) = state.pipeline.run_request(&mut ctx).await {
        return reject(status, message);
    }

    let response = next.run(req).await;

    let mut summary = GatewayResponse::new(response.status().as_u16())
        .with_service(response.extensions().get::<ServiceId>().copied());
    state.pipeline.run_response(&ctx, &mut summary).await;
    response
}

fn reject(status: u16, message: String) -> Response {
    match StatusCode::from_u16(status) {
        Ok(StatusCode::UNAUTHORIZED) => PanelError::Unauthorized.into_response(),
        Ok(code) => (code, Json(json!({ "message": message }))).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let cfg = GatewayServerConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.bind, "0.0.0.0");
        assert_eq!(cfg.session_mode, SessionMode::Signed);
        assert_eq!(cfg.gateway.upstream_timeout_ms, 10_000);
        assert_eq!(cfg.gateway.upstreams.len(), 2);
        assert!(cfg.gateway.upstreams.iter().all(|u| u.base_url.is_none()));
        assert!(!cfg.cookie_secure);
    }

    #[test]
    fn reads_upstreams_and_session_settings() {
        let cfg = GatewayServerConfig::from_lookup(lookup(&[
            ("GATEWAY_PORT", "8080"),
            ("SHARED_VARIABLES_SERVICE_URL", "http://sv:4000"),
            ("SHARED_VARIABLES_SERVICE_API_KEY", "sv-key"),
            ("PLAN_CONTROLLER_SERVICE_URL", "  "),
            ("SESSION_MODE", "Marker"),
            ("COOKIE_SECURE", "true"),
            ("UPSTREAM_TIMEOUT_MS", "2500"),
        ]));
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.session_mode, SessionMode::Marker);
        assert!(cfg.cookie_secure);
        assert_eq!(cfg.gateway.upstream_timeout_ms, 2500);

        let shared = &cfg.gateway.upstreams[0];
        assert_eq!(shared.service, ServiceId::SharedVariables);
        assert_eq!(shared.base_url.as_deref(), Some("http://sv:4000"));
        assert_eq!(shared.api_key.as_deref(), Some("sv-key"));
        assert!(cfg.gateway.upstreams[1].base_url.is_none());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = GatewayServerConfig::from_lookup(lookup(&[
            ("ADMIN_PASSWORD", "hunter2"),
            ("SESSION_SIGNING_KEY", "signing-secret"),
            ("SHARED_VARIABLES_SERVICE_API_KEY", "sv-key"),
        ]));
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("signing-secret"));
        assert!(!debug.contains("sv-key"));
    }

    #[test]
    fn malformed_url_aborts_startup() {
        let cfg = GatewayServerConfig::from_lookup(lookup(&[(
            "PLAN_CONTROLLER_SERVICE_URL",
            "not a url",
        )]));
        assert!(matches!(
            GatewayServer::new(cfg).build_app(),
            Err(StartupError::Config(_))
        ));
    }
}
