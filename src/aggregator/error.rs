//! Error types for aggregation.

use super::FleetSummary;
use thiserror::Error;

/// Lookup failures for machine-scoped operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregatorError {
    #[error("Unknown machine")]
    UnknownMachine(String),

    #[error("Unknown service")]
    UnknownService { machine: String, service: String },
}

/// Failures building the fleet-wide summary.
///
/// Never surfaced as a hard error: every variant converts into an empty
/// summary the dashboard can still render.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    #[error("Backend unreachable")]
    Unreachable(String),

    #[error("Backend returned {0}")]
    Status(u16),

    #[error("Backend returned malformed response")]
    Decode(String),

    #[error("Probe round exceeded {0}ms")]
    RoundTimeout(u64),
}

impl UpstreamError {
    pub fn into_summary(self) -> FleetSummary {
        FleetSummary::empty(self.to_string())
    }
}
