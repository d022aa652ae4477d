//! Fleet definition configuration

use crate::fleet::{Category, Protocol};
use serde::{Deserialize, Serialize};

/// One machine in the fleet.
///
/// # Example
///
/// ```toml
/// [[machines]]
/// id = "JL1"
/// host = "192.168.1.169"
/// label = "Mac Studio"
///
/// [[machines.services]]
/// name = "Ollama"
/// port = 11434
/// path = "/api/tags"
/// category = "ai"
/// start_cmd = "ollama serve"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    pub id: String,
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

/// One service declared under a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub port: u16,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub category: Category,
    /// Overrides the machine host (tunnels, proxied endpoints)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Advisory start command shown in fix steps. Never executed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_cmd: Option<String>,
}

impl ServiceConfig {
    /// Plain HTTP backend service with no start hint.
    pub fn new(name: &str, port: u16, path: &str) -> Self {
        Self {
            name: name.to_string(),
            port,
            path: path.to_string(),
            protocol: Protocol::Http,
            category: Category::Backend,
            host: None,
            start_cmd: None,
        }
    }
}

fn default_path() -> String {
    "/".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_defaults() {
        let toml = r#"
        name = "Memory Sync"
        port = 8766
        "#;
        let service: ServiceConfig = toml::from_str(toml).unwrap();
        assert_eq!(service.path, "/");
        assert_eq!(service.protocol, Protocol::Http);
        assert_eq!(service.category, Category::Backend);
        assert!(service.start_cmd.is_none());
    }

    #[test]
    fn test_machine_with_services() {
        let toml = r#"
        id = "JL1"
        host = "192.168.1.169"

        [[services]]
        name = "Ollama"
        port = 11434
        path = "/api/tags"
        category = "ai"
        start_cmd = "ollama serve"

        [[services]]
        name = "Edge"
        port = 443
        protocol = "https"
        category = "tunnel"
        host = "edge.example.net"
        "#;
        let machine: MachineConfig = toml::from_str(toml).unwrap();
        assert_eq!(machine.services.len(), 2);
        assert_eq!(machine.services[0].category, Category::Ai);
        assert_eq!(machine.services[0].start_cmd.as_deref(), Some("ollama serve"));
        assert_eq!(machine.services[1].protocol, Protocol::Https);
        assert_eq!(machine.services[1].host.as_deref(), Some("edge.example.net"));
    }

    #[test]
    fn test_machine_without_services() {
        let toml = r#"
        id = "JLb"
        host = "192.168.1.149"
        "#;
        let machine: MachineConfig = toml::from_str(toml).unwrap();
        assert!(machine.services.is_empty());
        assert!(machine.label.is_none());
    }
}
