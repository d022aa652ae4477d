use crate::session::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApprovalError {
    /// Transport failure or an undecodable reply from the observer.
    #[error("Observer unreachable: {0}")]
    ObserverUnreachable(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}
