//! Normalized health model.
//!
//! Upstream services report health in slightly different shapes. A
//! [`HealthSnapshot`] is the uniform display model rebuilt on every poll:
//! it is never stored.
//!
//! A service counts as [`HealthStatus::Healthy`] only when its own `status`
//! field reads `healthy` and every dependency it declares under
//! `database_connections` reads `connected`. Dependencies a service does not
//! declare are not held against it.

use crate::gateway::ServiceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Overall state of one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    /// Reachable, but the reported status or a dependency is not healthy.
    Degraded,
    /// The probe failed or the service reported an error.
    Error,
}

/// Connection state of a single dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// Reported state of one dependency (cache, relational store, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyStatus {
    pub status: ConnectionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Memory figures as reported; upstreams send them pre-formatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsage {
    #[serde(default)]
    pub total_mb: Option<Value>,
    #[serde(default)]
    pub free_mb: Option<Value>,
    #[serde(default)]
    pub used_mb: Option<Value>,
    #[serde(default)]
    pub used_percentage: Option<Value>,
}

/// Optional host load metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemLoad {
    #[serde(default)]
    pub load_average_1min: Option<f64>,
    #[serde(default)]
    pub load_average_5min: Option<f64>,
    #[serde(default)]
    pub load_average_15min: Option<f64>,
    #[serde(default)]
    pub cpu_count: Option<u32>,
    #[serde(default)]
    pub memory_usage: Option<MemoryUsage>,
}

/// Uniform, per-poll view of one service's health.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSnapshot {
    /// Human-readable service name.
    pub service: String,
    pub status: HealthStatus,
    /// The raw `status` string the service reported, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_status: Option<String>,
    pub dependencies: BTreeMap<String, DependencyStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_load: Option<SystemLoad>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<String>,
    /// Timestamp reported by the service, or the probe time when absent.
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthSnapshot {
    /// Snapshot for a probe that produced no usable report.
    pub fn error(service: ServiceId, message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            service: service.display_name().to_string(),
            status: HealthStatus::Error,
            reported_status: None,
            dependencies: BTreeMap::new(),
            system_load: None,
            uptime: None,
            timestamp: now.to_rfc3339(),
            error: Some(message.into()),
        }
    }

    /// Normalize a health report returned with HTTP status `http_status`.
    ///
    /// A non-success status is an error snapshot even if the body parses;
    /// the body's `error` or `message` field becomes the error text.
    pub fn from_report(
        service: ServiceId,
        http_status: u16,
        body: &Value,
        now: DateTime<Utc>,
    ) -> Self {
        let reported_status = body.get("status").and_then(Value::as_str).map(str::to_string);
        let dependencies = parse_dependencies(body.get("database_connections"));
        let system_load = body
            .get("system_load")
            .and_then(|v| serde_json::from_value::<SystemLoad>(v.clone()).ok());
        let uptime = body.get("uptime").and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        let timestamp = body
            .get("timestamp")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| now.to_rfc3339());

        let (status, error) = if !(200..300).contains(&http_status) {
            let message = body
                .get("error")
                .or_else(|| body.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("health probe returned HTTP {http_status}"));
            (HealthStatus::Error, Some(message))
        } else {
            (classify(reported_status.as_deref(), &dependencies), None)
        };

        Self {
            service: service.display_name().to_string(),
            status,
            reported_status,
            dependencies,
            system_load,
            uptime,
            timestamp,
            error,
        }
    }
}

fn classify(
    reported: Option<&str>,
    dependencies: &BTreeMap<String, DependencyStatus>,
) -> HealthStatus {
    match reported {
        Some("error") => HealthStatus::Error,
        Some("healthy")
            if dependencies
                .values()
                .all(|d| d.status == ConnectionState::Connected) =>
        {
            HealthStatus::Healthy
        }
        _ => HealthStatus::Degraded,
    }
}

fn parse_dependencies(raw: Option<&Value>) -> BTreeMap<String, DependencyStatus> {
    let Some(Value::Object(map)) = raw else {
        return BTreeMap::new();
    };
    map.iter()
        .map(|(name, dep)| {
            let status = match dep.get("status").and_then(Value::as_str) {
                Some("connected") => ConnectionState::Connected,
                _ => ConnectionState::Disconnected,
            };
            let error = dep.get("error").and_then(Value::as_str).map(str::to_string);
            (name.clone(), DependencyStatus { status, error })
        })
        .collect()
}

/// Worst status across a set of snapshots; an empty set is healthy.
pub fn overall_status<'a>(snapshots: impl IntoIterator<Item = &'a HealthSnapshot>) -> HealthStatus {
    snapshots
        .into_iter()
        .fold(HealthStatus::Healthy, |acc, s| match (&acc, &s.status) {
            (HealthStatus::Error, _) | (_, HealthStatus::Error) => HealthStatus::Error,
            (HealthStatus::Degraded, _) | (_, HealthStatus::Degraded) => HealthStatus::Degraded,
            _ => HealthStatus::Healthy,
        })
}
