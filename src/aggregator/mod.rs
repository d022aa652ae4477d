//! Concurrent fan-out of probes and merging into summaries.
//!
//! A round issues every probe at once and joins on all of them, so its wall
//! time tracks the slowest probe rather than the sum. Each probe carries its
//! own timeout; the fleet-wide round is additionally wrapped in an outer one.

mod error;
mod summary;
pub mod upstream;
mod wake;


pub use error::*;
pub use summary::*;
pub use wake::*;

use crate::config::AggregatorConfig;
use crate::fleet::{Fleet, ServiceSpec};
use crate::probe::{ProbeResult, Prober};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Runs probe rounds over the configured fleet.
pub struct Aggregator {
    fleet: Arc<Fleet>,
    prober: Prober,
    config: AggregatorConfig,
    /// Client for the upstream aggregate endpoint
    client: reqwest::Client,
}

impl Aggregator {
    pub fn new(fleet: Arc<Fleet>, prober: Prober, config: AggregatorConfig) -> Self {
        Self {
            fleet,
            prober,
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn prober(&self) -> &Prober {
        &self.prober
    }

    /// Probe every spec concurrently; one result per spec, in input order.
    pub async fn check_fleet(&self, specs: &[ServiceSpec]) -> FleetSummary {
        let results = self.probe_all(specs).await;

        let summary = FleetSummary::from_results(results);
        tracing::debug!(
            up = summary.summary.up,
            total = summary.summary.total,
            "Fleet probe round completed"
        );
        summary
    }

    /// Host reachability plus every service of one machine, concurrently.
    pub async fn check_machine(&self, machine_id: &str) -> Result<MachineSummary, AggregatorError> {
        let machine = self
            .fleet
            .machine(machine_id)
            .ok_or_else(|| AggregatorError::UnknownMachine(machine_id.to_string()))?;

        let (host_reachable, results) = tokio::join!(
            self.prober.host_reachable(&machine.host),
            self.probe_all(&machine.services)
        );

        let services = pair(&machine.services, results);
        let summary = MachineSummary::new(machine, host_reachable, services);

        tracing::info!(
            machine = %summary.machine,
            host_reachable = summary.host_reachable,
            all_up = summary.all_up,
            "Machine checked"
        );
        Ok(summary)
    }

    /// Summary served by `/health`.
    ///
    /// Proxies the upstream aggregate endpoint when one is configured,
    /// otherwise runs a local round over the whole fleet under the outer
    /// round timeout.
    pub async fn fleet_health(&self) -> Result<FleetSummary, UpstreamError> {
        match &self.config.upstream_url {
            Some(url) => {
                let timeout = Duration::from_millis(self.config.upstream_timeout_ms);
                upstream::fetch_fleet_health(&self.client, url, timeout).await
            }
            None => {
                let specs = self.fleet.all_services();
                let round = Duration::from_millis(self.config.round_timeout_ms);
                tokio::time::timeout(round, self.check_fleet(&specs))
                    .await
                    .map_err(|_| UpstreamError::RoundTimeout(self.config.round_timeout_ms))
            }
        }
    }

    /// Re-probe one named service, or every service of the machine when
    /// `service` is `None`. Read-only; nothing is started.
    pub async fn wake(
        &self,
        machine_id: &str,
        service: Option<&str>,
    ) -> Result<WakeReport, AggregatorError> {
        let machine = self
            .fleet
            .machine(machine_id)
            .ok_or_else(|| AggregatorError::UnknownMachine(machine_id.to_string()))?;

        match service {
            Some(name) => {
                let spec = machine
                    .service(name)
                    .ok_or_else(|| AggregatorError::UnknownService {
                        machine: machine_id.to_string(),
                        service: name.to_string(),
                    })?;
                let result = self.prober.probe(spec).await;
                let check = ServiceCheck {
                    spec: spec.clone(),
                    result,
                };
                Ok(WakeReport::Service(ServiceWake::from_check(check)))
            }
            None => {
                let results = self.probe_all(&machine.services).await;
                let checks = pair(&machine.services, results);
                Ok(WakeReport::Machine(MachineWake::new(&machine.id, checks)))
            }
        }
    }

    async fn probe_all(&self, specs: &[ServiceSpec]) -> Vec<ProbeResult> {
        join_all(specs.iter().map(|spec| self.prober.probe(spec))).await
    }
}

fn pair(specs: &[ServiceSpec], results: Vec<ProbeResult>) -> Vec<ServiceCheck> {
    specs
        .iter()
        .cloned()
        .zip(results)
        .map(|(spec, result)| ServiceCheck { spec, result })
        .collect()
}
