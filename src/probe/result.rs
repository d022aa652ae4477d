//! Probe outcome types.

use crate::fleet::Category;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Classified liveness of one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// Answered 2xx within the slow threshold
    Up,
    /// Answered 2xx within the hard timeout but past the slow threshold
    Slow,
    /// Timed out, refused, failed, or answered non-2xx
    Down,
}

impl ProbeStatus {
    /// Whether the service answered at all.
    pub fn is_responding(&self) -> bool {
        !matches!(self, ProbeStatus::Down)
    }

    /// Lenient wire decoding; anything unrecognised is `Down`.
    pub fn from_wire(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "up" | "ok" | "healthy" => ProbeStatus::Up,
            "slow" | "degraded" => ProbeStatus::Slow,
            _ => ProbeStatus::Down,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeStatus::Up => "up",
            ProbeStatus::Slow => "slow",
            ProbeStatus::Down => "down",
        }
    }
}

/// Result of probing one service once. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub name: String,
    pub machine: String,
    pub category: Category,
    pub status: ProbeStatus,
    /// Elapsed time, serialized as whole milliseconds
    #[serde(with = "duration_ms")]
    pub latency: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProbeResult {
    pub fn latency_ms(&self) -> u64 {
        self.latency.as_millis() as u64
    }
}

pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    /// Accepts integer or fractional milliseconds; negatives clamp to zero.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = f64::deserialize(d)?;
        Ok(Duration::from_millis(ms.max(0.0) as u64))
    }
}
