//! Per-request relay state.

use crate::cache::ResponseCache;
use crate::error::Result;
use crate::generation::TextStream;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info_span, warn, Instrument};
use uuid::Uuid;

/// Accumulates one streamed answer and caches it on clean completion.
///
/// The session owns the upstream stream and the sending half of the relay
/// channel; both are released when [`run`](Self::run) returns, whichever
/// way it exits.
pub(super) struct StreamSession {
    id: Uuid,
    query: String,
    buffer: String,
    cache: Arc<dyn ResponseCache>,
    ttl: Duration,
}

impl StreamSession {
    pub(super) fn new(query: &str, cache: Arc<dyn ResponseCache>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            query: query.to_string(),
            buffer: String::new(),
            cache,
            ttl,
        }
    }

    /// Forward every segment in order, then cache the full text.
    pub(super) async fn run(self, segments: TextStream, tx: mpsc::Sender<Result<String>>) {
        let span = info_span!("relay_session", session_id = %self.id);
        self.relay(segments, tx).instrument(span).await
    }

    async fn relay(mut self, mut segments: TextStream, tx: mpsc::Sender<Result<String>>) {
        let mut forwarded = 0usize;

        while let Some(item) = segments.next().await {
            match item {
                Ok(segment) => {
                    if segment.is_empty() {
                        continue;
                    }
                    self.buffer.push_str(&segment);
                    if tx.send(Ok(segment)).await.is_err() {
                        warn!("Client went away after {} segments; discarding answer", forwarded);
                        return;
                    }
                    forwarded += 1;
                }
                Err(e) => {
                    error!("Completion failed after {} segments: {}", forwarded, e);
                    // The receiver may already be gone; nothing else to do either way.
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            }
        }

        debug!("Completion finished: {} segments, {} chars", forwarded, self.buffer.len());

        // Cache before `tx` drops so a consumer that saw end-of-stream also sees the entry.
        if let Err(e) = self.cache.set(&self.query, self.buffer, self.ttl).await {
            warn!("Failed to cache answer: {}", e);
        }
    }
}
