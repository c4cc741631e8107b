//! Upstream health endpoints
//!
//! GET /health?service={id}  - relay one service's health report verbatim
//! GET /health/summary       - normalized snapshots of every service

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use panel_kernel::gateway::{CallKind, HttpMethod, ServiceId};
use serde::Deserialize;

use crate::backend::UpstreamReply;
use crate::error::{PanelError, PanelResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HealthQuery {
    pub service: Option<String>,
}

/// GET /health?service={id}
///
/// A missing or unknown `service` is a client error; nothing is defaulted.
pub async fn service_health(
    State(state): State<AppState>,
    Query(query): Query<HealthQuery>,
) -> PanelResult<UpstreamReply> {
    let service: ServiceId = query
        .service
        .ok_or_else(|| PanelError::UnknownService(String::new()))?
        .parse()?;

    state
        .dispatcher
        .forward(service, CallKind::Health, HttpMethod::Get, &["health"], None)
        .await
}

/// GET /health/summary
///
/// Always 200; per-service failures live inside each snapshot.
pub async fn health_summary(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.health.summary().await)
}

/// Build the health router sub-tree
pub fn health_router() -> axum::Router<AppState> {
    use axum::routing::get;
    axum::Router::new()
        .route("/health", get(service_health))
        .route("/health/summary", get(health_summary))
}
