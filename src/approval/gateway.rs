//! Server side of the approval flow.

use super::{ApprovalError, ApprovalOutcome, ApprovalStatus, ApprovalTicket, ObserverClient, StartRequest};
use crate::session::{SessionStore, SessionToken};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// How long a redeemed approval id is remembered, in seconds.
const REDEEMED_RETENTION_SECS: i64 = 3600;

/// Result of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResponse {
    pub status: ApprovalStatus,
    /// Set only on the poll that first observed `approved`
    pub token: Option<SessionToken>,
}

/// Relays approval requests to the observer and turns the first `approved`
/// observation of each approval id into exactly one local session.
///
/// Holds no state about pending approvals; the observer is re-read on every
/// poll.
pub struct ApprovalGateway {
    observer: Arc<dyn ObserverClient>,
    sessions: Arc<SessionStore>,
    app_id: String,
    email: String,
    redeemed: DashMap<String, DateTime<Utc>>,
}

impl ApprovalGateway {
    pub fn new(
        observer: Arc<dyn ObserverClient>,
        sessions: Arc<SessionStore>,
        app_id: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            observer,
            sessions,
            app_id: app_id.into(),
            email: email.into(),
            redeemed: DashMap::new(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Ask the observer to open an approval session for a client at `ip`.
    pub async fn start(&self, ip: &str) -> Result<ApprovalTicket, ApprovalError> {
        let request = StartRequest {
            app_id: self.app_id.clone(),
            email: self.email.clone(),
            ip: ip.to_string(),
        };

        let ticket = self.observer.start(&request).await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to start approval session");
            e
        })?;

        tracing::info!(session_id = %ticket.session_id, "Approval session started");
        Ok(ticket)
    }

    /// Re-read the status of `session_id` from the observer.
    pub async fn poll(&self, session_id: &str) -> Result<PollResponse, ApprovalError> {
        let status = self.observer.status(session_id).await.map_err(|e| {
            tracing::warn!(session_id, error = %e, "Approval poll failed");
            e
        })?;

        let token = match status.outcome() {
            Some(ApprovalOutcome::Approved) => self.redeem(session_id)?,
            Some(outcome) => {
                tracing::info!(session_id, outcome = outcome.as_label(), "Approval session ended");
                metrics::counter!("fleetwatch_approvals_total", "outcome" => outcome.as_label())
                    .increment(1);
                None
            }
            None => None,
        };

        Ok(PollResponse { status, token })
    }

    /// Issue a session unless this approval id has already produced one.
    fn redeem(&self, session_id: &str) -> Result<Option<SessionToken>, ApprovalError> {
        let now = Utc::now();
        let retention = chrono::Duration::seconds(REDEEMED_RETENTION_SECS);
        self.redeemed
            .retain(|_, redeemed_at| now - *redeemed_at < retention);

        // Only the caller whose insert finds no prior entry mints the token.
        if self.redeemed.insert(session_id.to_string(), now).is_some() {
            tracing::debug!(session_id, "Approval already redeemed");
            return Ok(None);
        }

        match self.sessions.issue() {
            Ok(token) => {
                tracing::info!(session_id, "Approval granted, session issued");
                metrics::counter!("fleetwatch_approvals_total", "outcome" => "approved")
                    .increment(1);
                Ok(Some(token))
            }
            Err(e) => {
                self.redeemed.remove(session_id);
                Err(e.into())
            }
        }
    }
}
