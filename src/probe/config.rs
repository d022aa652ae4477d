//! Configuration for service probing.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeouts and thresholds applied to every probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Hard bound on one service probe, body included
    pub timeout_ms: u64,
    /// Successful probes slower than this are classified `slow`
    pub slow_threshold_ms: u64,
    /// Port used for the raw host reachability check
    pub host_check_port: u16,
    /// Bound on the host reachability connect
    pub host_timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 4000,
            slow_threshold_ms: 3000,
            host_check_port: 80,
            host_timeout_ms: 3000,
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn slow_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_threshold_ms)
    }

    pub fn host_timeout(&self) -> Duration {
        Duration::from_millis(self.host_timeout_ms)
    }
}
