//! Session termination reasons.
//!
//! Each session records exactly one [`TerminationReason`]: the outcome of
//! whichever of its three operations finished first. The bridge cancels
//! the other two, awaits them, and discards their (later) outcomes.

use std::fmt;

use crate::endpoint::EndpointError;

/// The tagged outcome of a session.
///
/// The first five variants are failures and carry the error that caused
/// them; the last three are normal ends of a session and are not
/// escalated to failure logs.
#[derive(Debug)]
pub enum TerminationReason {
    /// Reading from the byte-stream endpoint failed (including a rolling
    /// read deadline expiring with no data).
    StreamReadFailed(EndpointError),
    /// Writing a relayed payload to the byte-stream endpoint failed.
    StreamWriteFailed(EndpointError),
    /// Reading from the framed endpoint failed (including the rolling
    /// read deadline expiring with neither traffic nor a keepalive ack).
    FrameReadFailed(EndpointError),
    /// Writing a binary frame to the framed endpoint failed.
    FrameWriteFailed(EndpointError),
    /// Sending a keepalive ping failed.
    KeepaliveFailed(EndpointError),
    /// The byte-stream peer closed its write side (end-of-stream).
    StreamEof,
    /// The framed peer sent a close frame.
    PeerClosed,
    /// The session's cancellation token was triggered externally, or the
    /// operation observed cancellation during teardown.
    Cancelled,
}

impl TerminationReason {
    /// Whether this reason should be surfaced as a session failure.
    ///
    /// Peer-initiated closure, end-of-stream, and explicit cancellation
    /// are how sessions are *supposed* to end; everything else is
    /// reported to the caller as a failure.
    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            Self::StreamEof | Self::PeerClosed | Self::Cancelled
        )
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StreamReadFailed(e) => write!(f, "stream read failed: {e}"),
            Self::StreamWriteFailed(e) => write!(f, "stream write failed: {e}"),
            Self::FrameReadFailed(e) => write!(f, "frame read failed: {e}"),
            Self::FrameWriteFailed(e) => write!(f, "frame write failed: {e}"),
            Self::KeepaliveFailed(e) => write!(f, "keepalive ping failed: {e}"),
            Self::StreamEof => write!(f, "stream reached end-of-stream"),
            Self::PeerClosed => write!(f, "peer sent close frame"),
            Self::Cancelled => write!(f, "session cancelled"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
