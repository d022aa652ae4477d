//! # Metrics
//!
//! Prometheus export of probe and session activity.
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `fleetwatch_probes_total{machine, status}` - Probes by outcome
//! - `fleetwatch_approvals_total{outcome}` - Terminal approval outcomes
//!
//! **Histograms:**
//! - `fleetwatch_probe_latency_seconds{machine, service}` - Probe latency
//!
//! **Gauges:**
//! - `fleetwatch_sessions_active` - Live session tokens
//! - `fleetwatch_machines_total` - Configured machines
//! - `fleetwatch_services_total` - Configured services
//! - `fleetwatch_uptime_seconds` - Seconds since the dashboard started

pub mod handler;

pub use metrics_exporter_prometheus::PrometheusBuilder;

use crate::fleet::Fleet;
use std::sync::Arc;
use std::time::Instant;

/// Owns the Prometheus handle and computes fleet-shape gauges on demand.
pub struct MetricsCollector {
    fleet: Arc<Fleet>,
    start_time: Instant,
    prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(
        fleet: Arc<Fleet>,
        start_time: Instant,
        prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        Self {
            fleet,
            start_time,
            prometheus_handle,
        }
    }

    pub fn update_fleet_gauges(&self) {
        metrics::gauge!("fleetwatch_machines_total").set(self.fleet.machines().len() as f64);
        metrics::gauge!("fleetwatch_services_total").set(self.fleet.service_count() as f64);
        metrics::gauge!("fleetwatch_uptime_seconds").set(self.uptime_seconds() as f64);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Prometheus text exposition.
    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Install the global Prometheus recorder.
///
/// Probe latency buckets span the sub-second range up to past the default
/// probe timeout: [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1, 2, 3, 4, 5, 10].
pub fn setup_metrics(
) -> Result<metrics_exporter_prometheus::PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::Matcher;

    let latency_buckets = &[
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 10.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("fleetwatch_probe_latency_seconds".to_string()),
            latency_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Install the recorder, or fall back to a detached handle when one is
/// already installed (tests, repeated router construction).
pub fn handle_or_detached() -> metrics_exporter_prometheus::PrometheusHandle {
    setup_metrics().unwrap_or_else(|e| {
        tracing::debug!("Metrics already initialized, creating detached handle: {}", e);
        PrometheusBuilder::new().build_recorder().handle()
    })
}
