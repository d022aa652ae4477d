use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an approval session as reported by the observer.
///
/// Decodes from any string. Values this crate does not know are kept verbatim
/// and treated like `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Denied,
    Expired,
    NotFound,
    Other(String),
}

/// Terminal result of an approval session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    Approved,
    Denied,
    Expired,
}

impl ApprovalOutcome {
    /// Message surfaced to the user for failed outcomes.
    pub fn message(&self) -> &'static str {
        match self {
            ApprovalOutcome::Approved => "approved",
            ApprovalOutcome::Denied => "access denied",
            ApprovalOutcome::Expired => "session expired",
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            ApprovalOutcome::Approved => "approved",
            ApprovalOutcome::Denied => "denied",
            ApprovalOutcome::Expired => "expired",
        }
    }
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Denied => "denied",
            ApprovalStatus::Expired => "expired",
            ApprovalStatus::NotFound => "not_found",
            ApprovalStatus::Other(s) => s,
        }
    }

    /// `None` means keep polling.
    pub fn outcome(&self) -> Option<ApprovalOutcome> {
        match self {
            ApprovalStatus::Approved => Some(ApprovalOutcome::Approved),
            ApprovalStatus::Denied => Some(ApprovalOutcome::Denied),
            ApprovalStatus::Expired | ApprovalStatus::NotFound => Some(ApprovalOutcome::Expired),
            ApprovalStatus::Pending | ApprovalStatus::Other(_) => None,
        }
    }
}

impl From<String> for ApprovalStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => ApprovalStatus::Pending,
            "approved" => ApprovalStatus::Approved,
            "denied" => ApprovalStatus::Denied,
            "expired" => ApprovalStatus::Expired,
            "not_found" => ApprovalStatus::NotFound,
            _ => ApprovalStatus::Other(s),
        }
    }
}

impl From<ApprovalStatus> for String {
    fn from(status: ApprovalStatus) -> Self {
        match status {
            ApprovalStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
