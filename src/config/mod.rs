//! Configuration module for fleetwatch
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`FLEETWATCH_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use fleetwatch::config::FleetwatchConfig;
//!
//! let config = FleetwatchConfig::default();
//! assert_eq!(config.server.port, 8080);
//!
//! let toml = r#"
//! [server]
//! port = 9000
//!
//! [[machines]]
//! id = "JL1"
//! host = "192.168.1.169"
//! "#;
//! let config: FleetwatchConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.server.port, 9000);
//! assert_eq!(config.machines.len(), 1);
//! ```

pub mod aggregator;
pub mod auth;
pub mod error;
pub mod feed;
pub mod fleet;
pub mod logging;
pub mod server;

pub use aggregator::AggregatorConfig;
pub use auth::AuthConfig;
pub use error::ConfigError;
pub use feed::FeedConfig;
pub use fleet::{MachineConfig, ServiceConfig};
pub use logging::{LogFormat, LoggingConfig};
pub use server::ServerConfig;

// Re-export ProbeConfig from probe module
pub use crate::probe::ProbeConfig;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Unified configuration for the fleetwatch server and CLI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FleetwatchConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Per-probe timeouts and thresholds
    pub probe: ProbeConfig,
    /// Fleet-wide aggregation settings
    pub aggregator: AggregatorConfig,
    /// Session and approval settings
    pub auth: AuthConfig,
    /// Live event relay
    pub feed: FeedConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Static fleet definition
    pub machines: Vec<MachineConfig>,
}

impl FleetwatchConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are ignored and the previous value kept.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("FLEETWATCH_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("FLEETWATCH_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("FLEETWATCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("FLEETWATCH_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(url) = std::env::var("FLEETWATCH_UPSTREAM_URL") {
            if !url.is_empty() {
                self.aggregator.upstream_url = Some(url);
            }
        }
        if let Ok(url) = std::env::var("FLEETWATCH_OBSERVER_URL") {
            if !url.is_empty() {
                self.auth.observer_url = url;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "port must be non-zero",
            ));
        }

        if self.probe.slow_threshold_ms >= self.probe.timeout_ms {
            return Err(ConfigError::validation(
                "probe.slow_threshold_ms",
                "slow threshold must be below the probe timeout",
            ));
        }

        // The outer round bound is a backstop; it must never cut a probe
        // short that is still within its own timeout.
        if self.aggregator.round_timeout_ms <= self.probe.timeout_ms {
            return Err(ConfigError::validation(
                "aggregator.round_timeout_ms",
                "round timeout must exceed the probe timeout",
            ));
        }

        if self.feed.reconnect_delay_ms == 0 {
            return Err(ConfigError::validation(
                "feed.reconnect_delay_ms",
                "reconnect delay must be non-zero",
            ));
        }
        if self.feed.idle_timeout_ms == 0 {
            return Err(ConfigError::validation(
                "feed.idle_timeout_ms",
                "idle timeout must be non-zero",
            ));
        }

        if self.auth.poll_interval_ms == 0 {
            return Err(ConfigError::validation(
                "auth.poll_interval_ms",
                "poll interval must be non-zero",
            ));
        }

        if self.auth.session_ttl_seconds == 0 {
            return Err(ConfigError::validation(
                "auth.session_ttl_seconds",
                "session TTL must be non-zero",
            ));
        }

        let mut machine_ids = HashSet::new();
        for (i, machine) in self.machines.iter().enumerate() {
            if machine.id.is_empty() {
                return Err(ConfigError::validation(
                    format!("machines[{}].id", i),
                    "id cannot be empty",
                ));
            }
            if machine.host.is_empty() {
                return Err(ConfigError::validation(
                    format!("machines[{}].host", i),
                    "host cannot be empty",
                ));
            }
            if !machine_ids.insert(machine.id.as_str()) {
                return Err(ConfigError::Duplicate {
                    kind: "machine",
                    name: machine.id.clone(),
                });
            }

            let mut service_names = HashSet::new();
            for (j, service) in machine.services.iter().enumerate() {
                if service.name.is_empty() {
                    return Err(ConfigError::validation(
                        format!("machines[{}].services[{}].name", i, j),
                        "name cannot be empty",
                    ));
                }
                if service.port == 0 {
                    return Err(ConfigError::validation(
                        format!("machines[{}].services[{}].port", i, j),
                        "port must be non-zero",
                    ));
                }
                if !service_names.insert(service.name.as_str()) {
                    return Err(ConfigError::Duplicate {
                        kind: "service",
                        name: format!("{}/{}", machine.id, service.name),
                    });
                }
            }
        }

        Ok(())
    }
}
