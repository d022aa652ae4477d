//! Static fleet definition.
//!
//! Machines and their services are declared in configuration and never change
//! while the process runs, so the fleet is a plain ordered list rather than a
//! concurrent registry.

mod spec;

pub use spec::*;

use crate::config::MachineConfig;

/// Ordered set of machines under monitoring.
///
/// # Examples
///
/// ```
/// use fleetwatch::config::{MachineConfig, ServiceConfig};
/// use fleetwatch::fleet::Fleet;
///
/// let fleet = Fleet::from_config(&[MachineConfig {
///     id: "JL1".to_string(),
///     host: "192.168.1.169".to_string(),
///     label: None,
///     services: vec![ServiceConfig::new("Ollama", 11434, "/api/tags")],
/// }]);
///
/// assert_eq!(fleet.service_count(), 1);
/// assert_eq!(fleet.machine("JL1").unwrap().services[0].url(), "http://192.168.1.169:11434/api/tags");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Fleet {
    machines: Vec<Machine>,
}

impl Fleet {
    pub fn new(machines: Vec<Machine>) -> Self {
        Self { machines }
    }

    /// Build the fleet from `[[machines]]` config sections.
    ///
    /// A service inherits its machine's host unless it names its own.
    pub fn from_config(machines: &[MachineConfig]) -> Self {
        let machines = machines
            .iter()
            .map(|m| Machine {
                id: m.id.clone(),
                host: m.host.clone(),
                label: m.label.clone(),
                services: m
                    .services
                    .iter()
                    .map(|s| ServiceSpec {
                        name: s.name.clone(),
                        machine: m.id.clone(),
                        host: s.host.clone().unwrap_or_else(|| m.host.clone()),
                        port: s.port,
                        protocol: s.protocol,
                        path: normalize_path(&s.path),
                        category: s.category,
                        start_cmd: s.start_cmd.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self { machines }
    }

    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    pub fn machine(&self, id: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| m.id == id)
    }

    /// Every service in machine order, then declaration order.
    pub fn all_services(&self) -> Vec<ServiceSpec> {
        self.machines
            .iter()
            .flat_map(|m| m.services.iter().cloned())
            .collect()
    }

    pub fn service_count(&self) -> usize {
        self.machines.iter().map(|m| m.services.len()).sum()
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
