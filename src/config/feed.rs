//! Live event feed configuration

use serde::{Deserialize, Serialize};

/// Upstream live event stream relayed to dashboard clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Streaming endpoint (NDJSON or SSE). Relay is off when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Fixed delay between reconnect attempts
    pub reconnect_delay_ms: u64,
    /// A connection that delivers nothing for this long is dropped and retried
    pub idle_timeout_ms: u64,
    /// Broadcast channel capacity
    pub buffer: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: None,
            reconnect_delay_ms: 3000,
            idle_timeout_ms: 60_000,
            buffer: 256,
        }
    }
}
