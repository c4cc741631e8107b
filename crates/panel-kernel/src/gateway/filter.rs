//! Gateway filter trait.
//!
//! A filter chain is an ordered list of [`GatewayFilter`] instances applied
//! to every guarded request and its response. Filters are sorted by their
//! declared [`FilterOrder`] and executed in ascending order on the request
//! path and descending order on the response path.
//!
//! ```text
//! Request  ──► PreAuth ──► Auth ──► Logging ──► handler / upstream call
//! Response ◄── PreAuth ◄── Auth ◄── Logging ◄──
//! ```

use super::types::{GatewayContext, GatewayResponse};
use async_trait::async_trait;

// ─────────────────────────────────────────────────────────────────────────────
// Filter ordering
// ─────────────────────────────────────────────────────────────────────────────

/// Numeric ordering slot for a filter in the chain.
///
/// Filters with equal order values are executed in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FilterOrder(pub u32);

impl FilterOrder {
    /// Executes before authentication (e.g. request id injection).
    pub const PRE_AUTH: FilterOrder = FilterOrder(0);
    /// Session check slot.
    pub const AUTH: FilterOrder = FilterOrder(100);
    /// Access logging slot; only sees requests that passed auth.
    pub const LOGGING: FilterOrder = FilterOrder(400);
}

// ─────────────────────────────────────────────────────────────────────────────
// Filter action
// ─────────────────────────────────────────────────────────────────────────────

/// Instruction returned by [`GatewayFilter::on_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FilterAction {
    /// Pass the request to the next filter or the handler.
    Continue,
    /// Short-circuit the chain and answer with the given HTTP status and
    /// message. No handler code and no upstream I/O runs.
    Reject(u16, String),
}

// ─────────────────────────────────────────────────────────────────────────────
// GatewayFilter trait
// ─────────────────────────────────────────────────────────────────────────────

/// Kernel contract for a single filter in the gateway pipeline.
///
/// Filters are infallible: a filter that cannot decide must reject.
#[async_trait]
pub trait GatewayFilter: Send + Sync {
    /// Stable, human-readable identifier for this filter (used in logs).
    fn name(&self) -> &str;

    /// Position in the filter chain. Lower values execute first on the
    /// request path.
    fn order(&self) -> FilterOrder;

    /// Called with the inbound request before any handler runs.
    async fn on_request(&self, ctx: &mut GatewayContext) -> FilterAction;

    /// Called with the response summary before it is returned to the caller.
    async fn on_response(&self, _ctx: &GatewayContext, _resp: &mut GatewayResponse) {}
}
