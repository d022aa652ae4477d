//! Relay of an upstream live event stream to dashboard clients.
//!
//! The relay holds one streaming HTTP connection, decodes it line by line and
//! fans events out over a broadcast channel. When the stream ends, fails or
//! goes silent past the idle bound it waits a fixed delay before reconnecting.

mod events;


pub use events::*;

use crate::config::FeedConfig;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Largest single event accepted from the stream or forwarded to a client.
pub const MAX_EVENT_BYTES: usize = 16 * 1024;

/// Default bound on a silent connection.
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to connect: {0}")]
    Connect(String),

    #[error("Feed returned {0}")]
    Status(u16),

    #[error("Stream interrupted: {0}")]
    Stream(String),

    #[error("No data for {0}ms")]
    Idle(u64),
}

/// Reconnecting consumer of the upstream live stream.
pub struct FeedRelay {
    client: reqwest::Client,
    url: String,
    reconnect_delay: Duration,
    idle_timeout: Duration,
    sender: broadcast::Sender<FeedEvent>,
}

impl FeedRelay {
    pub fn new(url: impl Into<String>, reconnect_delay: Duration, sender: broadcast::Sender<FeedEvent>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            reconnect_delay,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            sender,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Build a relay for `config.url`, or `None` when no feed is configured.
    pub fn from_config(config: &FeedConfig, sender: broadcast::Sender<FeedEvent>) -> Option<Self> {
        config.url.as_ref().map(|url| {
            Self::new(
                url.clone(),
                Duration::from_millis(config.reconnect_delay_ms),
                sender,
            )
            .with_idle_timeout(Duration::from_millis(config.idle_timeout_ms))
        })
    }

    /// Run until `cancel_token` fires.
    pub fn start(self, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(
                url = %self.url,
                reconnect_delay_ms = self.reconnect_delay.as_millis() as u64,
                "Feed relay started"
            );

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    result = self.stream_once() => match result {
                        Ok(relayed) => tracing::info!(relayed, "Feed stream closed"),
                        Err(e) => tracing::warn!(error = %e, "Feed stream failed"),
                    },
                }

                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    _ = tokio::time::sleep(self.reconnect_delay) => {
                        tracing::debug!("Reconnecting to feed");
                    }
                }
            }

            tracing::info!("Feed relay shutting down");
        })
    }

    /// Consume one connection to completion. Returns the number of events
    /// relayed.
    ///
    /// Waiting for the response head and for every chunk is bounded by the
    /// idle timeout; a silent connection ends with [`FeedError::Idle`].
    pub async fn stream_once(&self) -> Result<usize, FeedError> {
        let request = self
            .client
            .get(&self.url)
            .header(
                reqwest::header::ACCEPT,
                "application/x-ndjson, text/event-stream",
            )
            .send();

        let response = tokio::time::timeout(self.idle_timeout, request)
            .await
            .map_err(|_| self.idle_error())?
            .map_err(|e| FeedError::Connect(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }
        tracing::info!(url = %self.url, "Feed connected");

        let mut stream = response.bytes_stream();
        let mut lines = LineBuffer::new(MAX_EVENT_BYTES);
        let mut relayed = 0;

        loop {
            let chunk = match tokio::time::timeout(self.idle_timeout, stream.next()).await {
                Ok(Some(chunk)) => chunk.map_err(|e| FeedError::Stream(e.to_string()))?,
                Ok(None) => break,
                Err(_) => return Err(self.idle_error()),
            };

            for line in lines.push(&chunk) {
                relayed += self.relay_line(&line);
            }
        }

        if let Some(line) = lines.finish() {
            relayed += self.relay_line(&line);
        }

        Ok(relayed)
    }

    fn idle_error(&self) -> FeedError {
        FeedError::Idle(self.idle_timeout.as_millis() as u64)
    }

    fn relay_line(&self, line: &[u8]) -> usize {
        let Some(event) = decode(&String::from_utf8_lossy(line)) else {
            return 0;
        };
        tracing::trace!(kind = event.kind(), "Relaying feed event");
        // No subscribers is not an error.
        let _ = self.sender.send(event);
        1
    }
}

/// Splits a byte stream into lines, dropping any line longer than `limit`.
///
/// An oversized line is discarded up to its terminating newline without
/// being held in memory.
#[derive(Debug)]
struct LineBuffer {
    buf: Vec<u8>,
    limit: usize,
    discarding: bool,
}

impl LineBuffer {
    fn new(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit,
            discarding: false,
        }
    }

    /// Feed a chunk; returns every line it completed, without the newline.
    fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut complete = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|b| *b == b'\n') {
            let head = &rest[..pos];
            if self.discarding {
                self.discarding = false;
            } else if self.buf.len() + head.len() <= self.limit {
                self.buf.extend_from_slice(head);
                complete.push(std::mem::take(&mut self.buf));
            } else {
                self.drop_oversized();
                self.discarding = false;
            }
            self.buf.clear();
            rest = &rest[pos + 1..];
        }

        if !self.discarding {
            if self.buf.len() + rest.len() > self.limit {
                self.drop_oversized();
            } else {
                self.buf.extend_from_slice(rest);
            }
        }

        complete
    }

    /// Trailing line left when the stream closed.
    fn finish(&mut self) -> Option<Vec<u8>> {
        if self.discarding || self.buf.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.buf))
    }

    fn drop_oversized(&mut self) {
        tracing::warn!(limit = self.limit, "Dropping oversized feed line");
        self.buf = Vec::new();
        self.discarding = true;
    }
}
