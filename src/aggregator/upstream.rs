//! Defensive decoding of an upstream fleet backend's aggregate health.

use super::{FleetSummary, UpstreamError};
use crate::fleet::Category;
use crate::probe::{ProbeResult, ProbeStatus};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Path of the aggregate endpoint on the fleet backend.
pub const FLEET_HEALTH_PATH: &str = "/fleet/health/all";

#[derive(Deserialize)]
struct UpstreamHealth {
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    services: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct UpstreamService {
    name: String,
    #[serde(default)]
    machine: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    latency: Option<f64>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl From<UpstreamService> for ProbeResult {
    fn from(s: UpstreamService) -> Self {
        ProbeResult {
            name: s.name,
            machine: s.machine,
            category: s
                .category
                .as_deref()
                .map(Category::from_wire)
                .unwrap_or_default(),
            status: s
                .status
                .as_deref()
                .map(ProbeStatus::from_wire)
                .unwrap_or(ProbeStatus::Down),
            latency: Duration::from_millis(s.latency.unwrap_or(0.0).max(0.0) as u64),
            detail: s.detail.and_then(|d| match d {
                serde_json::Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            }),
        }
    }
}

/// Decode an aggregate body into a summary.
///
/// Entries that do not look like a service are dropped; counts are always
/// recomputed from what survived rather than trusted from the peer.
pub fn parse_fleet_health(body: &str) -> Result<FleetSummary, UpstreamError> {
    let health: UpstreamHealth =
        serde_json::from_str(body).map_err(|e| UpstreamError::Decode(e.to_string()))?;

    let services: Vec<ProbeResult> = health
        .services
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<UpstreamService>(value) {
            Ok(service) => Some(service.into()),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed upstream service entry");
                None
            }
        })
        .collect();

    let ts = health
        .ts
        .as_deref()
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    Ok(FleetSummary::at(ts, services))
}

/// Fetch `{base_url}/fleet/health/all` within `timeout`.
pub async fn fetch_fleet_health(
    client: &reqwest::Client,
    base_url: &str,
    timeout: Duration,
) -> Result<FleetSummary, UpstreamError> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), FLEET_HEALTH_PATH);

    let response = client
        .get(&url)
        .timeout(timeout)
        .header(reqwest::header::CACHE_CONTROL, "no-store")
        .send()
        .await
        .map_err(|e| UpstreamError::Unreachable(e.to_string()))?;

    if !response.status().is_success() {
        return Err(UpstreamError::Status(response.status().as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| UpstreamError::Unreachable(e.to_string()))?;

    parse_fleet_health(&body)
}
