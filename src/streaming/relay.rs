//! Event-stream relay with keep-alive comments
//!
//! A spawned relay task owns both the upstream reader and the heartbeat
//! ticker, multiplexed under one `select!`. It feeds a bounded channel that
//! the caller's response body drains. When the caller goes away the receiver
//! is dropped, the task sees the channel close, and both the reader and the
//! ticker are dropped with it. The same happens when upstream ends or fails.

use std::fmt::Display;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::AppError;

/// SSE comment frame sent while waiting for upstream data
pub const HEARTBEAT_FRAME: &[u8] = b": heartbeat\n\n";

const CHANNEL_CAPACITY: usize = 32;

/// Body stream handed to the HTTP response
pub type RelayBody = Pin<Box<dyn Stream<Item = Result<Bytes, io::Error>> + Send>>;

/// How a relay ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Upstream closed the stream normally
    Completed,
    /// Reading from upstream failed; the caller connection was aborted
    UpstreamFailed,
    /// The caller stopped reading before upstream finished
    CallerDisconnected,
}

/// A running relay
pub struct RelayHandle {
    /// Stream of bytes for the caller
    pub body: RelayBody,
    /// Relay task; resolves once the ticker and reader have been released
    pub task: JoinHandle<RelayOutcome>,
}

/// Pass-through relay for `text/event-stream` responses
#[derive(Debug, Clone)]
pub struct StreamRelay {
    heartbeat_interval: Duration,
}

impl StreamRelay {
    pub fn new(heartbeat_interval: Duration) -> Self {
        Self { heartbeat_interval }
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    /// Start relaying `upstream` to a new caller body.
    ///
    /// Chunks are forwarded verbatim and in order. Heartbeats start one
    /// interval after the relay begins.
    pub fn relay<S, E>(&self, upstream: S) -> RelayHandle
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);
        let task = tokio::spawn(run_relay(Box::pin(upstream), tx, self.heartbeat_interval));

        let body = async_stream::stream! {
            while let Some(item) = rx.recv().await {
                yield item;
            }
        };

        RelayHandle {
            body: Box::pin(body),
            task,
        }
    }
}

async fn run_relay<S, E>(
    mut upstream: Pin<Box<S>>,
    tx: mpsc::Sender<Result<Bytes, io::Error>>,
    period: Duration,
) -> RelayOutcome
where
    S: Stream<Item = Result<Bytes, E>> + Send,
    E: Display,
{
    let started = Instant::now();
    let mut ticker = interval_at(started + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut chunks: u64 = 0;
    let mut bytes_relayed: u64 = 0;
    let mut heartbeats: u64 = 0;

    let outcome = loop {
        tokio::select! {
            _ = tx.closed() => break RelayOutcome::CallerDisconnected,

            _ = ticker.tick() => {
                heartbeats += 1;
                metrics::counter!("thinkrelay_heartbeats_total").increment(1);
                if tx.send(Ok(Bytes::from_static(HEARTBEAT_FRAME))).await.is_err() {
                    break RelayOutcome::CallerDisconnected;
                }
            }

            next = upstream.next() => match next {
                Some(Ok(bytes)) => {
                    chunks += 1;
                    bytes_relayed += bytes.len() as u64;
                    if tx.send(Ok(bytes)).await.is_err() {
                        break RelayOutcome::CallerDisconnected;
                    }
                }
                Some(Err(e)) => {
                    let err = AppError::StreamRelay(e.to_string());
                    warn!(error = %err, chunks, "Aborting relayed stream");
                    // Headers are already flushed; an errored body aborts the connection
                    let _ = tx.send(Err(io::Error::new(io::ErrorKind::Other, err.to_string()))).await;
                    break RelayOutcome::UpstreamFailed;
                }
                None => break RelayOutcome::Completed,
            }
        }
    };

    match outcome {
        RelayOutcome::CallerDisconnected => debug!(
            chunks,
            bytes = bytes_relayed,
            heartbeats,
            "Caller disconnected, relay stopped"
        ),
        _ => info!(
            outcome = ?outcome,
            chunks,
            bytes = bytes_relayed,
            heartbeats,
            duration_ms = started.elapsed().as_millis() as u64,
            "Relayed stream finished"
        ),
    }

    outcome
}
