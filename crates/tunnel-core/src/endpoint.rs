//! Endpoint abstractions consumed by the session bridge.
//!
//! The bridge never touches sockets directly. It is written against four
//! small traits: the two halves of a byte-stream endpoint and the two
//! halves of a framed-message endpoint. The `tunnel-relay` crate provides
//! the real TCP and WebSocket implementations; tests provide in-memory
//! ones backed by channels.
//!
//! Each endpoint is split into independently owned halves because the
//! bridge moves the read halves into their forwarder tasks while sharing
//! the write halves (the framed write half is used by both the
//! stream→frame forwarder and the keepalive loop, serialized by one
//! mutex owned by the session).

use async_trait::async_trait;
use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors surfaced by endpoint reads and writes.
///
/// These are transport-level failures. The bridge does not interpret them
/// beyond wrapping them in a [`TerminationReason`] variant that records
/// which direction and which endpoint failed.
///
/// [`TerminationReason`]: crate::termination::TerminationReason
#[derive(Debug, Error)]
pub enum EndpointError {
    /// An underlying socket operation failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// An inbound frame exceeded the configured maximum payload size.
    ///
    /// The framed endpoint must enforce its inbound cap and fail the read
    /// with this distinct variant rather than truncating or buffering the
    /// oversized frame.
    #[error("inbound frame of {size} bytes exceeds the {limit}-byte limit")]
    FrameTooLarge {
        /// Size the peer declared (or delivered) for the frame.
        size: usize,
        /// The configured maximum inbound payload size.
        limit: usize,
    },

    /// A read or write did not complete within its deadline.
    ///
    /// Produced by the bridge itself when a rolling read deadline or a
    /// bounded write deadline elapses; a silent peer is indistinguishable
    /// from a dead one, so this terminates the session.
    #[error("operation timed out")]
    TimedOut,

    /// Any other transport-specific failure (protocol violation, TLS
    /// error, handshake problem surfaced mid-stream, ...).
    #[error("transport error: {0}")]
    Transport(String),
}

// ── Frame model ───────────────────────────────────────────────────────────────

/// One inbound message as surfaced by the framed endpoint.
///
/// The bridge dispatches on the kind: binary payloads are forwarded to
/// the byte stream, text frames are discarded, pings/pongs are control
/// traffic (a pong's arrival refreshes the framed read deadline simply by
/// being read), and a close frame ends the session normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Application payload; forwarded verbatim to the byte stream.
    Binary(Vec<u8>),
    /// Text payload; never forwarded to the byte stream.
    Text(String),
    /// Peer keepalive probe. The transport library answers it on its own;
    /// the bridge only observes it.
    Ping(Vec<u8>),
    /// Acknowledgment of one of our keepalive probes.
    Pong(Vec<u8>),
    /// The peer initiated (or completed) the close handshake.
    Close,
}

// ── Byte-stream endpoint halves ───────────────────────────────────────────────

/// Read half of a byte-stream endpoint.
#[async_trait]
pub trait StreamReader: Send {
    /// Reads the next chunk of bytes from the stream.
    ///
    /// Returns:
    ///
    /// - `Ok(Some(bytes))` – a chunk arrived. An *empty* chunk is legal
    ///   and means "nothing to forward, read again"; it is not an error
    ///   and not end-of-stream.
    /// - `Ok(None)` – the peer closed its write side (end-of-stream).
    /// - `Err(_)` – the read failed.
    ///
    /// The chunk size bound is the implementation's choice (the TCP
    /// adapter uses a fixed 8 KiB buffer). The bridge applies its own
    /// rolling read deadline around this call.
    async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>, EndpointError>;
}

/// Write half of a byte-stream endpoint.
#[async_trait]
pub trait StreamWriter: Send {
    /// Writes the whole buffer to the stream, handling partial writes
    /// internally.
    async fn write_all(&mut self, data: &[u8]) -> Result<(), EndpointError>;

    /// Closes the write side of the stream.
    ///
    /// Called exactly once by the bridge when the session ends.
    async fn shutdown(&mut self) -> Result<(), EndpointError>;
}

// ── Framed-message endpoint halves ────────────────────────────────────────────

/// Read half of a framed-message endpoint.
#[async_trait]
pub trait FrameReader: Send {
    /// Reads the next frame.
    ///
    /// Implementations must enforce their configured maximum inbound
    /// payload size and fail with [`EndpointError::FrameTooLarge`] when a
    /// peer exceeds it. The bridge applies its rolling read deadline
    /// around this call; any frame — a pong included — refreshes it.
    async fn read_frame(&mut self) -> Result<Frame, EndpointError>;
}

/// Write half of a framed-message endpoint.
///
/// # Usage contract
///
/// Two of the session's operations write frames (the stream→frame
/// forwarder and the keepalive loop). The session serializes them behind
/// one `tokio::sync::Mutex`, so implementations may assume calls never
/// overlap and each call emits exactly one whole frame.
#[async_trait]
pub trait FrameWriter: Send {
    /// Emits one binary frame carrying `payload`.
    async fn send_binary(&mut self, payload: Vec<u8>) -> Result<(), EndpointError>;

    /// Emits one keepalive ping control frame.
    async fn send_ping(&mut self) -> Result<(), EndpointError>;

    /// Emits a normal-closure close control frame.
    async fn send_close(&mut self) -> Result<(), EndpointError>;

    /// Flushes and closes the transport.
    ///
    /// Called exactly once by the bridge after the close handshake
    /// attempt, regardless of how the session ended.
    async fn close(&mut self) -> Result<(), EndpointError>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
