//! Session bridge orchestration.
//!
//! [`run_session`] is the heart of ws-tunnel: it takes the four endpoint
//! halves of one session, runs the three concurrent operations (two
//! forwarders and the keepalive loop), and coordinates their shutdown so
//! that the first outcome wins, no task outlives the session, and both
//! endpoints end up closed exactly once.
//!
//! # Lifecycle
//!
//! 1. The write halves are wrapped in `Arc<tokio::sync::Mutex<_>>`. The
//!    framed write gate serializes the stream→frame forwarder against the
//!    keepalive loop (two writers, one connection); the stream write gate
//!    is only contended between its forwarder and the final shutdown.
//! 2. The three operations are spawned into a [`JoinSet`], each holding a
//!    clone of the session's [`CancellationToken`].
//! 3. The first operation to finish supplies the session's
//!    [`TerminationReason`].
//! 4. The token is cancelled. Every blocking await inside the operations
//!    is raced against it, so parked reads and writes unblock promptly.
//! 5. The `JoinSet` is drained until empty — a structured join: however
//!    many operations there are, none can leak past the bridge's return.
//! 6. A best-effort close handshake runs under the framed write gate,
//!    bounded by `close_timeout`, then both endpoints are closed
//!    unconditionally.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::config::BridgeConfig;
use crate::endpoint::{FrameReader, FrameWriter, StreamReader, StreamWriter};
use crate::termination::TerminationReason;

mod forward;
mod keepalive;

/// Bridges one byte-stream endpoint and one framed endpoint until the
/// session terminates.
///
/// Returns the session's single termination reason — the outcome of
/// whichever operation finished first. By the time this function
/// returns, all three operations have finished and both endpoints have
/// been closed.
///
/// The caller supplies the cancellation token; cancelling it from
/// outside ends the session with [`TerminationReason::Cancelled`]
/// (a normal, non-failure end).
pub async fn run_session<SR, SW, FR, FW>(
    stream_rx: SR,
    stream_tx: SW,
    frame_rx: FR,
    frame_tx: FW,
    config: Arc<BridgeConfig>,
    cancel: CancellationToken,
) -> TerminationReason
where
    SR: StreamReader + 'static,
    SW: StreamWriter + 'static,
    FR: FrameReader + 'static,
    FW: FrameWriter + 'static,
{
    let frame_tx = Arc::new(Mutex::new(frame_tx));
    let stream_tx = Arc::new(Mutex::new(stream_tx));

    let mut ops: JoinSet<TerminationReason> = JoinSet::new();
    ops.spawn(forward::stream_to_frame(
        stream_rx,
        Arc::clone(&frame_tx),
        Arc::clone(&config),
        cancel.clone(),
    ));
    ops.spawn(forward::frame_to_stream(
        frame_rx,
        Arc::clone(&stream_tx),
        Arc::clone(&config),
        cancel.clone(),
    ));
    ops.spawn(keepalive::run(
        Arc::clone(&frame_tx),
        Arc::clone(&config),
        cancel.clone(),
    ));

    // First outcome wins; it is the session's authoritative reason.
    let reason = match ops.join_next().await {
        Some(Ok(reason)) => reason,
        Some(Err(e)) => {
            // An operation panicked. Treat it like an external cancel so
            // teardown still runs; the panic itself is the real report.
            error!("session operation panicked: {e}");
            TerminationReason::Cancelled
        }
        // Unreachable: three operations were just spawned.
        None => TerminationReason::Cancelled,
    };

    // Unblock and await the remaining operations. Their outcomes are
    // collected (so no task leaks) but discarded.
    cancel.cancel();
    while let Some(joined) = ops.join_next().await {
        if let Err(e) = joined {
            error!("session operation panicked during teardown: {e}");
        }
    }

    // Best-effort graceful close on the framed endpoint, then close both
    // endpoints unconditionally. The write gate is taken even though the
    // forwarders are gone: it is part of the framed writer's contract.
    {
        let mut frames = frame_tx.lock().await;
        let _ = timeout(config.close_timeout, frames.send_close()).await;
        let _ = timeout(config.close_timeout, frames.close()).await;
    }
    {
        let mut stream = stream_tx.lock().await;
        let _ = timeout(config.close_timeout, stream.shutdown()).await;
    }

    reason
}
