//! Bounded-time liveness probing of fleet services.
//!
//! A probe never fails: every transport, status, or body problem is folded
//! into a `down` result carrying the elapsed time up to the bound.

mod config;
mod error;
mod parser;
mod result;


pub use config::*;
pub use error::*;
pub use parser::extract_detail;
pub use result::*;

use crate::fleet::ServiceSpec;
use std::io;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

/// Issues health requests and raw host checks.
///
/// Holds only a pooled HTTP client and immutable settings, so one instance is
/// shared by every concurrent probe.
#[derive(Clone)]
pub struct Prober {
    client: reqwest::Client,
    config: ProbeConfig,
}

impl Prober {
    /// Create a prober with its own HTTP client.
    pub fn new(config: ProbeConfig) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout())
            .pool_max_idle_per_host(4)
            .build()
            .expect("Failed to build HTTP client");

        Self { client, config }
    }

    /// Create a prober with a custom HTTP client (for testing).
    pub fn with_client(config: ProbeConfig, client: reqwest::Client) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probe one service once.
    pub async fn probe(&self, spec: &ServiceSpec) -> ProbeResult {
        let start = Instant::now();
        let outcome = self.fetch(spec).await;

        let (status, latency, detail) = match outcome {
            Ok((latency, detail)) => (self.classify(latency), latency, detail),
            Err(error) => {
                let latency = start.elapsed().min(self.config.timeout());
                tracing::debug!(
                    machine = %spec.machine,
                    service = %spec.name,
                    url = %spec.url(),
                    error = %error,
                    "Probe failed"
                );
                (ProbeStatus::Down, latency, None)
            }
        };

        metrics::counter!("fleetwatch_probes_total",
            "machine" => spec.machine.clone(),
            "status" => status.as_str()
        )
        .increment(1);
        metrics::histogram!("fleetwatch_probe_latency_seconds",
            "machine" => spec.machine.clone(),
            "service" => spec.name.clone()
        )
        .record(latency.as_secs_f64());

        ProbeResult {
            name: spec.name.clone(),
            machine: spec.machine.clone(),
            category: spec.category,
            status,
            latency,
            detail,
        }
    }

    /// Latency is taken when the response head arrives; the body read still
    /// counts against the same hard timeout.
    async fn fetch(&self, spec: &ServiceSpec) -> Result<(Duration, Option<String>), ProbeError> {
        let start = Instant::now();
        let timeout_ms = self.config.timeout_ms;

        let response = self
            .client
            .get(spec.url())
            .timeout(self.config.timeout())
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(e, timeout_ms))?;
        let latency = start.elapsed();

        if !response.status().is_success() {
            return Err(ProbeError::HttpError(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::from_reqwest(e, timeout_ms))?;

        Ok((latency, extract_detail(&body)))
    }

    fn classify(&self, latency: Duration) -> ProbeStatus {
        if latency > self.config.slow_threshold() {
            ProbeStatus::Slow
        } else {
            ProbeStatus::Up
        }
    }

    /// Raw TCP reachability check against `host_check_port`.
    ///
    /// A refused connection means something on the host answered, so it
    /// counts as reachable. Timeouts and routing failures do not.
    pub async fn host_reachable(&self, host: &str) -> bool {
        check_host(host, self.config.host_check_port, self.config.host_timeout()).await
    }
}

/// Connect to `host:port` within `timeout`; see [`Prober::host_reachable`].
pub async fn check_host(host: &str, port: u16, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => true,
        Ok(Err(e)) => {
            tracing::debug!(host, port, error = %e, "Host unreachable");
            false
        }
        Err(_) => {
            tracing::debug!(host, port, timeout_ms = timeout.as_millis() as u64, "Host check timed out");
            false
        }
    }
}
