//! Admin panel gateway entry point.
//!
//! Reads configuration from environment variables and starts the axum-based
//! HTTP gateway service.
//!
//! # Environment variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_PORT` | `3000` | TCP port to listen on. |
//! | `GATEWAY_BIND` | `0.0.0.0` | Address to bind. |
//! | `SHARED_VARIABLES_SERVICE_URL` | *(none)* | Base URL of the shared-variables service. |
//! | `SHARED_VARIABLES_SERVICE_API_KEY` | *(none)* | Its API key. |
//! | `PLAN_CONTROLLER_SERVICE_URL` | *(none)* | Base URL of the plan controller. |
//! | `PLAN_CONTROLLER_SERVICE_API_KEY` | *(none)* | Its API key. |
//! | `ADMIN_PASSWORD` | *(none)* | Shared admin password; logins fail without it. |
//! | `SESSION_MODE` | `signed` | `signed` or `marker`. |
//! | `SESSION_SIGNING_KEY` | *(random)* | HMAC key for signed sessions. |
//! | `COOKIE_SECURE` | `false` | Mark the session cookie `Secure`. |
//! | `UPSTREAM_TIMEOUT_MS` | `10000` | Per-call upstream timeout. |
//! | `LOG_FORMAT` | `text` | `json` for JSON log lines. |

use panel_gateway::server::{GatewayServer, GatewayServerConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = GatewayServerConfig::from_env();
    info!(
        port = config.port,
        session_mode = ?config.session_mode,
        timeout_ms = config.gateway.upstream_timeout_ms,
        "starting panel gateway"
    );

    if let Err(e) = GatewayServer::new(config).start().await {
        error!(error = %e, "gateway failed");
        eprintln!("panel-gateway: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("panel_gateway=info,tower_http=info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
