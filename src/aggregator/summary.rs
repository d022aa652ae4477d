//! Fleet and machine summaries derived from one probe round.

use crate::fleet::{Machine, ServiceSpec};
use crate::probe::{ProbeResult, ProbeStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Up/total counts and their ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthCounts {
    /// Services classified `up`. `slow` does not count.
    pub up: usize,
    pub total: usize,
    /// `up / total`, or `0.0` for an empty fleet
    pub health: f64,
}

impl HealthCounts {
    pub fn from_results(results: &[ProbeResult]) -> Self {
        let total = results.len();
        let up = results
            .iter()
            .filter(|r| r.status == ProbeStatus::Up)
            .count();
        let health = if total == 0 {
            0.0
        } else {
            up as f64 / total as f64
        };
        Self { up, total, health }
    }

    pub fn empty() -> Self {
        Self {
            up: 0,
            total: 0,
            health: 0.0,
        }
    }
}

/// Fleet-wide view of one probe round, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    pub ts: DateTime<Utc>,
    pub summary: HealthCounts,
    pub services: Vec<ProbeResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FleetSummary {
    pub fn from_results(services: Vec<ProbeResult>) -> Self {
        Self::at(Utc::now(), services)
    }

    pub fn at(ts: DateTime<Utc>, services: Vec<ProbeResult>) -> Self {
        Self {
            ts,
            summary: HealthCounts::from_results(&services),
            services,
            error: None,
        }
    }

    /// Well-formed, renderable summary with no services.
    pub fn empty(error: impl Into<String>) -> Self {
        Self {
            ts: Utc::now(),
            summary: HealthCounts::empty(),
            services: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// A probe result together with the descriptor it was produced from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCheck {
    pub spec: ServiceSpec,
    pub result: ProbeResult,
}

impl ServiceCheck {
    pub fn is_down(&self) -> bool {
        !self.result.status.is_responding()
    }
}

/// One machine's host reachability plus its per-service results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineSummary {
    pub machine: String,
    pub host: String,
    pub host_reachable: bool,
    pub services: Vec<ServiceCheck>,
    /// Every service responding (`up` or `slow`); true for zero services
    pub all_up: bool,
    /// At least one service responding
    pub any_up: bool,
}

impl MachineSummary {
    pub fn new(machine: &Machine, host_reachable: bool, services: Vec<ServiceCheck>) -> Self {
        let all_up = services.iter().all(|s| !s.is_down());
        let any_up = services.iter().any(|s| !s.is_down());
        Self {
            machine: machine.id.clone(),
            host: machine.host.clone(),
            host_reachable,
            services,
            all_up,
            any_up,
        }
    }

    pub fn down_services(&self) -> impl Iterator<Item = &ServiceCheck> {
        self.services.iter().filter(|s| s.is_down())
    }
}
