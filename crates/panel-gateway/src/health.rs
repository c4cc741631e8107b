//! Health aggregation across every upstream.
//!
//! Probes run concurrently and each probe's failure is contained in its own
//! [`HealthSnapshot`]; one service being down never hides another's status.

use crate::backend::ProxyDispatcher;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use panel_kernel::gateway::{CallKind, HttpMethod, ServiceId};
use panel_kernel::health::{HealthSnapshot, HealthStatus, overall_status};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Combined health of every upstream.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSummary {
    pub overall: HealthStatus,
    pub services: Vec<HealthSnapshot>,
    pub checked_at: DateTime<Utc>,
}

pub struct HealthAggregator {
    dispatcher: Arc<ProxyDispatcher>,
}

impl HealthAggregator {
    pub fn new(dispatcher: Arc<ProxyDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Probe one service and normalize whatever comes back.
    pub async fn probe(&self, service: ServiceId) -> HealthSnapshot {
        let reply = self
            .dispatcher
            .forward(service, CallKind::Health, HttpMethod::Get, &["health"], None)
            .await;
        let now = Utc::now();
        match reply {
            Ok(reply) => {
                let body = reply.body.unwrap_or(Value::Null);
                HealthSnapshot::from_report(service, reply.status, &body, now)
            }
            Err(e) => HealthSnapshot::error(service, e.to_string(), now),
        }
    }

    /// Probe every registered service concurrently.
    pub async fn summary(&self) -> HealthSummary {
        let services: Vec<ServiceId> = self
            .dispatcher
            .registry()
            .slots()
            .iter()
            .map(|slot| slot.service())
            .collect();

        let services = join_all(services.into_iter().map(|s| self.probe(s))).await;
        let overall = overall_status(&services);
        debug!(overall = ?overall, probed = services.len(), "health summary");

        HealthSummary {
            overall,
            services,
            checked_at: Utc::now(),
        }
    }
}
