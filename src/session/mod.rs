//! Process-lifetime registry of opaque session tokens.
//!
//! Tokens are 256 random bits, hex-encoded, each with an absolute expiry.
//! Expired entries are swept lazily before every issue. Nothing is persisted:
//! a restart logs every client out.

mod clock;
mod error;


pub use clock::*;
pub use error::*;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const TOKEN_BYTES: usize = 32;

/// Opaque bearer credential handed to a client.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

// Keep tokens out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// Concurrency-safe token store with a fixed TTL.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<String, DateTime<Utc>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a fresh token valid for one TTL from now.
    pub fn issue(&self) -> Result<SessionToken, SessionError> {
        self.sweep();

        let mut bytes = [0u8; TOKEN_BYTES];
        getrandom::getrandom(&mut bytes).map_err(|e| SessionError::Entropy(e.to_string()))?;
        let token = hex::encode(bytes);

        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX);
        let expiry = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.sessions.insert(token.clone(), expiry);

        metrics::gauge!("fleetwatch_sessions_active").set(self.sessions.len() as f64);
        tracing::info!(active = self.sessions.len(), "Session issued");

        Ok(SessionToken(token))
    }

    /// True iff the token was issued here and has not yet expired.
    pub fn validate(&self, token: &str) -> bool {
        let now = self.clock.now();
        self.sessions
            .get(token)
            .map(|expiry| now < *expiry)
            .unwrap_or(false)
    }

    /// Drop every expired entry.
    pub fn sweep(&self) {
        let now = self.clock.now();
        let before = self.sessions.len();
        self.sessions.retain(|_, expiry| now < *expiry);

        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::debug!(removed, "Swept expired sessions");
            metrics::gauge!("fleetwatch_sessions_active").set(self.sessions.len() as f64);
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
