//! Client for the remote approval authority.

use super::{ApprovalError, ApprovalStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body of `POST /auth/start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartRequest {
    pub app_id: String,
    pub email: String,
    pub ip: String,
}

/// A freshly created approval session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalTicket {
    pub session_id: String,
    /// Short human-readable code shown to the user
    pub code: String,
    /// Validity hint in seconds, as reported by the observer
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct StatusReply {
    status: ApprovalStatus,
}

/// The observer authority, the single source of truth for approval state.
#[async_trait]
pub trait ObserverClient: Send + Sync {
    async fn start(&self, request: &StartRequest) -> Result<ApprovalTicket, ApprovalError>;

    async fn status(&self, session_id: &str) -> Result<ApprovalStatus, ApprovalError>;
}

/// Observer reached over HTTP.
pub struct HttpObserver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpObserver {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

fn unreachable(e: reqwest::Error) -> ApprovalError {
    ApprovalError::ObserverUnreachable(e.to_string())
}

#[async_trait]
impl ObserverClient for HttpObserver {
    async fn start(&self, request: &StartRequest) -> Result<ApprovalTicket, ApprovalError> {
        let url = format!("{}/auth/start", self.base_url);
        self.client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(unreachable)?
            .json::<ApprovalTicket>()
            .await
            .map_err(unreachable)
    }

    /// The reply body is decoded whatever the HTTP status; the observer
    /// answers unknown ids with a `not_found` status.
    async fn status(&self, session_id: &str) -> Result<ApprovalStatus, ApprovalError> {
        let mut url = reqwest::Url::parse(&format!("{}/auth/check", self.base_url))
            .map_err(|e| ApprovalError::ObserverUnreachable(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApprovalError::ObserverUnreachable("invalid observer url".to_string()))?
            .push(session_id);

        let reply = self
            .client
            .get(url)
            .send()
            .await
            .map_err(unreachable)?
            .json::<StatusReply>()
            .await
            .map_err(unreachable)?;
        Ok(reply.status)
    }
}
