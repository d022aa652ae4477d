//! Read-only re-probe reports for the wake endpoint.

use super::ServiceCheck;
use serde::Serialize;

/// Outcome of re-probing one service or a whole machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WakeReport {
    Service(ServiceWake),
    Machine(MachineWake),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceWake {
    pub machine: String,
    pub service: String,
    pub up: bool,
    pub latency: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Only present while the service is down
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cmd: Option<String>,
    pub message: String,
}

impl ServiceWake {
    pub fn from_check(check: ServiceCheck) -> Self {
        let up = !check.is_down();
        let message = if up {
            format!("{} is responding", check.spec.name)
        } else {
            match &check.spec.start_cmd {
                Some(cmd) => format!("{} is not responding. Start it with: {}", check.spec.name, cmd),
                None => format!(
                    "{} is not responding. Check port {}",
                    check.spec.name, check.spec.port
                ),
            }
        };

        Self {
            latency: check.result.latency_ms(),
            machine: check.spec.machine,
            service: check.spec.name,
            up,
            detail: check.result.detail,
            start_cmd: if up { None } else { check.spec.start_cmd },
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineWake {
    pub machine: String,
    pub services: Vec<WokenService>,
    pub all_up: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WokenService {
    pub name: String,
    pub up: bool,
    pub latency: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cmd: Option<String>,
}

impl MachineWake {
    pub fn new(machine: &str, checks: Vec<ServiceCheck>) -> Self {
        let services: Vec<WokenService> = checks
            .into_iter()
            .map(|check| {
                let up = !check.is_down();
                WokenService {
                    latency: check.result.latency_ms(),
                    name: check.spec.name,
                    up,
                    detail: check.result.detail,
                    start_cmd: if up { None } else { check.spec.start_cmd },
                }
            })
            .collect();

        Self {
            machine: machine.to_string(),
            all_up: services.iter().all(|s| s.up),
            services,
        }
    }
}
