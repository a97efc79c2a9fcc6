//! The two half-duplex forwarders.
//!
//! Each forwarder is one of the session's three concurrent operations:
//! it loops until it produces the session's (candidate) termination
//! reason, racing every blocking await against the shared cancellation
//! token so teardown never waits on a parked read or write.

use std::fmt::Write as _;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::BridgeConfig;
use crate::endpoint::{
    EndpointError, Frame, FrameReader, FrameWriter, StreamReader, StreamWriter,
};
use crate::termination::TerminationReason;

// ── Stream → frame ────────────────────────────────────────────────────────────

/// Moves bytes arriving on the stream endpoint into binary frames.
///
/// Reads are bounded by the rolling `stream_read_timeout`; an expiry is a
/// stream-read failure, not a retry. Empty chunks are a retry. Each
/// non-empty chunk becomes exactly one binary frame, emitted under the
/// session's framed write mutex with a bounded write deadline.
///
/// Outbound frames are intentionally not capped against the inbound
/// `max_frame_payload`; the stream chunk size keeps them small (see the
/// note on [`BridgeConfig::max_frame_payload`]).
pub(crate) async fn stream_to_frame<R, W>(
    mut stream_rx: R,
    frame_tx: Arc<Mutex<W>>,
    config: Arc<BridgeConfig>,
    cancel: CancellationToken,
) -> TerminationReason
where
    R: StreamReader,
    W: FrameWriter,
{
    loop {
        let read = tokio::select! {
            () = cancel.cancelled() => return TerminationReason::Cancelled,
            read = timeout(config.stream_read_timeout, stream_rx.read_chunk()) => read,
        };

        let chunk = match read {
            Ok(Ok(Some(chunk))) => chunk,
            Ok(Ok(None)) => return TerminationReason::StreamEof,
            Ok(Err(e)) => return TerminationReason::StreamReadFailed(e),
            Err(_) => return TerminationReason::StreamReadFailed(EndpointError::TimedOut),
        };

        // A zero-length successful read means "nothing to forward yet".
        if chunk.is_empty() {
            continue;
        }

        if config.log_payloads {
            trace_payload("stream->frame", &chunk);
        }

        // Lock acquisition and the write itself are both raced against
        // cancellation: another operation may already be tearing the
        // session down while holding the write gate.
        let write = tokio::select! {
            () = cancel.cancelled() => return TerminationReason::Cancelled,
            write = async {
                let mut frames = frame_tx.lock().await;
                timeout(config.write_timeout, frames.send_binary(chunk)).await
            } => write,
        };

        match write {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return TerminationReason::FrameWriteFailed(e),
            Err(_) => return TerminationReason::FrameWriteFailed(EndpointError::TimedOut),
        }
    }
}

// ── Frame → stream ────────────────────────────────────────────────────────────

/// Moves binary frames arriving on the framed endpoint into raw writes on
/// the stream endpoint.
///
/// The rolling `frame_read_timeout` restarts on every frame read — pongs
/// travel the same path, so an acknowledged keepalive refreshes the
/// deadline exactly like application traffic does. Dispatch by kind:
/// binary is forwarded, text is discarded, ping/pong are observed only,
/// close ends the session normally.
pub(crate) async fn frame_to_stream<R, W>(
    mut frame_rx: R,
    stream_tx: Arc<Mutex<W>>,
    config: Arc<BridgeConfig>,
    cancel: CancellationToken,
) -> TerminationReason
where
    R: FrameReader,
    W: StreamWriter,
{
    loop {
        let read = tokio::select! {
            () = cancel.cancelled() => return TerminationReason::Cancelled,
            read = timeout(config.frame_read_timeout, frame_rx.read_frame()) => read,
        };

        let frame = match read {
            Ok(Ok(frame)) => frame,
            Ok(Err(e)) => return TerminationReason::FrameReadFailed(e),
            Err(_) => return TerminationReason::FrameReadFailed(EndpointError::TimedOut),
        };

        match frame {
            Frame::Binary(payload) => {
                if config.log_payloads {
                    trace_payload("frame->stream", &payload);
                }

                let write = tokio::select! {
                    () = cancel.cancelled() => return TerminationReason::Cancelled,
                    write = async {
                        let mut stream = stream_tx.lock().await;
                        timeout(config.write_timeout, stream.write_all(&payload)).await
                    } => write,
                };

                match write {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => return TerminationReason::StreamWriteFailed(e),
                    Err(_) => {
                        return TerminationReason::StreamWriteFailed(EndpointError::TimedOut)
                    }
                }
            }

            // Text frames never reach the raw stream.
            Frame::Text(text) => {
                debug!("discarding {}-byte text frame", text.len());
            }

            // Control traffic. The transport answers pings itself; a
            // pong's arrival already refreshed the read deadline.
            Frame::Ping(_) | Frame::Pong(_) => {}

            Frame::Close => return TerminationReason::PeerClosed,
        }
    }
}

// ── Payload tracing ───────────────────────────────────────────────────────────

const HEX_BYTES_PER_LINE: usize = 32;

/// Hex-dumps a relayed payload at `trace` level, 32 bytes per line.
fn trace_payload(direction: &str, data: &[u8]) {
    trace!("{direction} ({} bytes)", data.len());
    for line in data.chunks(HEX_BYTES_PER_LINE) {
        trace!("{direction} {}", hex_line(line));
    }
}

/// Formats up to one line's worth of bytes as space-separated uppercase hex.
fn hex_line(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for byte in bytes {
        let _ = write!(out, "{byte:02X} ");
    }
    out.truncate(out.trim_end().len());
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
