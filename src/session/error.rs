use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to gather entropy for session token: {0}")]
    Entropy(String),
}
