//! Client side of the approval flow.

use super::{ApprovalError, ApprovalOutcome, ApprovalStatus, ApprovalTicket};
use async_trait::async_trait;
use std::time::Duration;

/// Anything that can report the current status of an approval session.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn poll_status(&self, session_id: &str) -> Result<ApprovalStatus, ApprovalError>;
}

/// Where the client is in the approval flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    AwaitingApproval {
        session_id: String,
        code: String,
        /// Completed polls; progress display only
        polls: u32,
    },
    Approved,
    Failed(String),
}

impl PollerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PollerState::Approved | PollerState::Failed(_))
    }
}

/// Drives one approval session to a terminal state.
///
/// There is no local retry cap: the observer's own `expired` status ends the
/// flow.
pub struct ApprovalPoller<S> {
    source: S,
    state: PollerState,
}

impl<S: StatusSource> ApprovalPoller<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: PollerState::Idle,
        }
    }

    pub fn state(&self) -> &PollerState {
        &self.state
    }

    /// Idle → AwaitingApproval. Ignored in any other state.
    pub fn begin(&mut self, ticket: ApprovalTicket) {
        if self.state == PollerState::Idle {
            self.state = PollerState::AwaitingApproval {
                session_id: ticket.session_id,
                code: ticket.code,
                polls: 0,
            };
        }
    }

    /// Perform one poll. Transport errors leave the state unchanged apart from
    /// the poll counter; terminal and idle states do nothing.
    pub async fn step(&mut self) -> &PollerState {
        let session_id = match &mut self.state {
            PollerState::AwaitingApproval {
                session_id, polls, ..
            } => {
                *polls += 1;
                session_id.clone()
            }
            _ => return &self.state,
        };

        match self.source.poll_status(&session_id).await {
            Ok(status) => match status.outcome() {
                Some(ApprovalOutcome::Approved) => self.state = PollerState::Approved,
                Some(outcome) => self.state = PollerState::Failed(outcome.message().to_string()),
                None => {}
            },
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "Transient poll failure");
            }
        }

        &self.state
    }

    /// Poll at a fixed cadence until terminal. Returns immediately when idle.
    pub async fn run(&mut self, interval: Duration) -> &PollerState {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        while matches!(self.state, PollerState::AwaitingApproval { .. }) {
            ticker.tick().await;
            self.step().await;
        }

        &self.state
    }

    pub fn into_source(self) -> S {
        self.source
    }
}
