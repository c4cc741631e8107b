//! Structured access-logging filter.
//!
//! Emits `tracing` events on both the request and response path, recording
//! path, method, request id, response status, upstream service, and
//! round-trip latency. Headers are never logged, so cookies and API keys
//! stay out of the log stream.

use async_trait::async_trait;
use panel_kernel::gateway::{
    FilterAction, FilterOrder, GatewayContext, GatewayFilter, GatewayResponse,
};
use tracing::{error, info};

#[derive(Default)]
pub struct LoggingFilter;

impl LoggingFilter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GatewayFilter for LoggingFilter {
    fn name(&self) -> &str {
        "access-log"
    }

    fn order(&self) -> FilterOrder {
        FilterOrder::LOGGING
    }

    async fn on_request(&self, ctx: &mut GatewayContext) -> FilterAction {
        info!(
            request_id    = %ctx.request.id,
            method        = ctx.request.method.as_str(),
            path          = %ctx.request.path,
            authenticated = ctx.authenticated,
            "→ inbound request"
        );
        ctx.set_attr("log.request_start_ms", &now_ms());
        FilterAction::Continue
    }

    async fn on_response(&self, ctx: &GatewayContext, resp: &mut GatewayResponse) {
        let start_ms: u64 = ctx.get_attr("log.request_start_ms").unwrap_or(0);
        let elapsed = now_ms().saturating_sub(start_ms);
        let service = resp.service.map(|s| s.as_str()).unwrap_or("-");

        if resp.status >= 500 {
            error!(
                request_id = %ctx.request.id,
                path       = %ctx.request.path,
                status     = resp.status,
                service,
                latency_ms = elapsed,
                "← error response"
            );
        } else {
            info!(
                request_id = %ctx.request.id,
                path       = %ctx.request.path,
                status     = resp.status,
                service,
                latency_ms = elapsed,
                "← outbound response"
            );
        }

        resp.latency_ms = elapsed;
    }
}

fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    u64::try_from(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis(),
    )
    .unwrap_or(u64::MAX)
}
