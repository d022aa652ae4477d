//! Error types for probing.

use thiserror::Error;

/// Why a probe came back `down`.
///
/// Callers only ever see `ProbeStatus::Down`; the variant is kept for logs.
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    /// Request did not finish within the probe bound
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Connection refused, reset, or routing failure
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Name resolution failed or the URL could not be built
    #[error("request failed: {0}")]
    Request(String),

    /// Endpoint answered with a non-2xx status
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Response body could not be read to completion
    #[error("body read failed: {0}")]
    Body(String),
}

impl ProbeError {
    /// Classify a reqwest error into a ProbeError.
    pub(crate) fn from_reqwest(e: reqwest::Error, timeout_ms: u64) -> Self {
        if e.is_timeout() {
            ProbeError::Timeout(timeout_ms)
        } else if e.is_connect() {
            ProbeError::ConnectionFailed(e.to_string())
        } else if e.is_body() || e.is_decode() {
            ProbeError::Body(e.to_string())
        } else {
            ProbeError::Request(e.to_string())
        }
    }
}
