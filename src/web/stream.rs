//! Snapshot streaming.
//!
//! A [`StreamBroadcaster`] drives one subscriber: it sends every cached
//! snapshot in source order, then either stops (push interval zero) or
//! sleeps and repeats until a send fails or the peer goes away.

use std::fmt::Display;
use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures::{Sink, SinkExt};
use tracing::{debug, warn};

use crate::feed::SnapshotReader;

/// Why a streaming session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// Push interval is zero: one pass was sent and the sink was closed.
    SinglePass,
    /// Sending a message failed.
    SendFailed,
    /// The peer disconnected while the loop was waiting for the next pass.
    Disconnected,
}

/// Pushes snapshots to one subscriber at a fixed interval.
#[derive(Debug, Clone)]
pub struct StreamBroadcaster {
    reader: SnapshotReader,
    push_interval: Duration,
}

impl StreamBroadcaster {
    /// Create a broadcaster. A zero `push_interval` sends a single pass.
    pub fn new(reader: SnapshotReader, push_interval: Duration) -> Self {
        Self {
            reader,
            push_interval,
        }
    }

    /// Interval between passes.
    pub fn push_interval(&self) -> Duration {
        self.push_interval
    }

    /// Stream to `sink` until the session ends.
    ///
    /// `closed` must resolve when the peer disconnects; it is polled only
    /// while waiting between passes.
    pub async fn run<S, C>(&self, sink: S, closed: C) -> StreamEnd
    where
        S: Sink<String>,
        S::Error: Display,
        C: Future<Output = ()>,
    {
        let mut sink = pin!(sink);
        let mut closed = pin!(closed);

        loop {
            if let Err(e) = self.send_pass(&mut sink).await {
                debug!(error = %e, "Error sending message or connection closed");
                return StreamEnd::SendFailed;
            }

            if self.push_interval.is_zero() {
                if let Err(e) = sink.close().await {
                    debug!(error = %e, "Error closing stream");
                }
                return StreamEnd::SinglePass;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.push_interval) => {}
                _ = &mut closed => return StreamEnd::Disconnected,
            }
        }
    }

    /// Send one message per cached source, in configured order.
    async fn send_pass<S>(&self, sink: &mut S) -> Result<(), S::Error>
    where
        S: Sink<String> + Unpin,
    {
        for source in self.reader.sources() {
            let Some(snapshot) = self.reader.get(source).await else {
                debug!(source = %source, "No cached feed yet, skipping");
                continue;
            };

            let json = match serde_json::to_string(&*snapshot) {
                Ok(json) => json,
                Err(e) => {
                    warn!(source = %source, error = %e, "Failed to serialize feed");
                    continue;
                }
            };

            sink.send(json).await?;
        }
        Ok(())
    }
}
