//! Fleet aggregation configuration

use serde::{Deserialize, Serialize};

/// Controls how `/health` builds its fleet summary.
///
/// With `upstream_url` set, the summary is fetched from a fleet backend's
/// `/fleet/health/all`; otherwise every configured service is probed locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_url: Option<String>,
    /// Bound on the upstream aggregate request
    pub upstream_timeout_ms: u64,
    /// Outer bound on one local probe round
    pub round_timeout_ms: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            upstream_url: None,
            upstream_timeout_ms: 10_000,
            round_timeout_ms: 15_000,
        }
    }
}
