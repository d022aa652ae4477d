//! Turns a machine summary into a human diagnosis and remediation steps.
//!
//! The branches are checked in a fixed order and the first match wins, so an
//! unreachable host always masks whatever its services reported.

use crate::aggregator::{MachineSummary, ServiceCheck};
use serde::Serialize;

/// Human-readable verdict for one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub diagnosis: String,
    pub fix_steps: Vec<String>,
}

/// Classify a machine summary. Pure; never fails.
pub fn diagnose(summary: &MachineSummary) -> Diagnosis {
    let id = &summary.machine;
    let has_services = !summary.services.is_empty();

    if !summary.host_reachable && has_services {
        return Diagnosis {
            diagnosis: format!(
                "{} is unreachable on the network. The machine may be powered off, sleeping, or disconnected from WiFi.",
                id
            ),
            fix_steps: vec![
                format!("Check that {} ({}) is powered on", id, summary.host),
                "Verify it's connected to the same WiFi network".to_string(),
                "Try waking the machine physically or via Wake-on-LAN".to_string(),
                "Check System Preferences > Energy Saver to prevent auto-sleep".to_string(),
            ],
        };
    }

    if has_services && !summary.any_up {
        return Diagnosis {
            diagnosis: format!(
                "{} is on the network but no services are responding. Services may need to be started.",
                id
            ),
            fix_steps: remediation(summary, summary.services.iter()),
        };
    }

    if !summary.all_up {
        let down: Vec<&ServiceCheck> = summary.down_services().collect();
        let diagnosis = if down.len() == 1 {
            format!("{} is online but 1 service is down.", id)
        } else {
            format!("{} is online but {} services are down.", id, down.len())
        };
        return Diagnosis {
            diagnosis,
            fix_steps: remediation(summary, down.into_iter()),
        };
    }

    if !has_services {
        return Diagnosis {
            diagnosis: format!("{} has no configured services yet.", id),
            fix_steps: vec!["This machine is awaiting deployment".to_string()],
        };
    }

    Diagnosis {
        diagnosis: format!(
            "{} is fully operational. All {} services responding.",
            id,
            summary.services.len()
        ),
        fix_steps: Vec::new(),
    }
}

/// SSH step followed by one start hint per listed service.
fn remediation<'a>(
    summary: &MachineSummary,
    services: impl Iterator<Item = &'a ServiceCheck>,
) -> Vec<String> {
    std::iter::once(format!("SSH into {}: ssh {}", summary.machine, summary.host))
        .chain(services.map(start_hint))
        .collect()
}

fn start_hint(check: &ServiceCheck) -> String {
    match &check.spec.start_cmd {
        Some(cmd) => format!("Start {}: {}", check.spec.name, cmd),
        None => format!("Start {}: Check port {}", check.spec.name, check.spec.port),
    }
}
