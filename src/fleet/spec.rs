use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport used to reach a service health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    pub fn scheme(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

/// Coarse grouping used by the dashboard to lay out services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Model servers and agents (Ollama, chat front-ends)
    Ai,
    /// Application APIs
    #[default]
    Backend,
    /// Public tunnels / edge endpoints
    Tunnel,
    /// Supporting infrastructure (sync daemons, proxies)
    Infra,
}

impl Category {
    /// Lenient decoding for payloads from other services.
    pub fn from_wire(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "ai" => Category::Ai,
            "tunnel" => Category::Tunnel,
            "infra" => Category::Infra,
            _ => Category::Backend,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Ai => "ai",
            Category::Backend => "backend",
            Category::Tunnel => "tunnel",
            Category::Infra => "infra",
        };
        f.write_str(s)
    }
}

/// Immutable descriptor of one network service on one machine.
///
/// Built once from configuration. `start_cmd` is advisory text shown to the
/// operator; nothing in this crate ever executes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub name: String,
    pub machine: String,
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    /// Health endpoint path, always starting with `/`
    pub path: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cmd: Option<String>,
}

impl ServiceSpec {
    /// Full probe URL: `{protocol}://{host}:{port}{path}`.
    pub fn url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.protocol.scheme(),
            self.host,
            self.port,
            self.path
        )
    }
}

/// A machine in the fleet and the services it is expected to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Machine {
    pub id: String,
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub services: Vec<ServiceSpec>,
}

impl Machine {
    pub fn service(&self, name: &str) -> Option<&ServiceSpec> {
        self.services.iter().find(|s| s.name == name)
    }
}
