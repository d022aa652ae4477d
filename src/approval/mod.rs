//! Out-of-band approval against a remote observer authority.
//!
//! The server half ([`ApprovalGateway`]) is stateless with respect to pending
//! approvals and is driven entirely by client polls. The client half
//! ([`ApprovalPoller`]) owns the polling loop.

mod error;
mod gateway;
mod observer;
mod poller;
mod status;


pub use error::*;
pub use gateway::*;
pub use observer::*;
pub use poller::*;
pub use status::*;

use async_trait::async_trait;

#[async_trait]
impl StatusSource for ApprovalGateway {
    async fn poll_status(&self, session_id: &str) -> Result<ApprovalStatus, ApprovalError> {
        self.poll(session_id).await.map(|response| response.status)
    }
}
