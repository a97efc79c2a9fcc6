//! # tunnel-core
//!
//! The session bridge engine for ws-tunnel: given one already-connected
//! raw byte stream (a TCP session) and one already-connected framed
//! message transport (a WebSocket connection), fuse them into a single
//! logical duplex channel.
//!
//! The bridge runs three concurrent operations per session —
//! stream→frame forwarding, frame→stream forwarding, and a periodic
//! keepalive ping — and tears all three down together as soon as the
//! first one finishes, guaranteeing that both endpoints are closed and
//! no task outlives the session.
//!
//! # Module map
//!
//! - **`endpoint`** – The traits the bridge speaks to: a byte-stream
//!   endpoint split into reader/writer halves, and a framed endpoint
//!   split into frame reader/writer halves. Concrete TCP and WebSocket
//!   adapters live in the `tunnel-relay` crate; in-memory test doubles
//!   implement the same traits.
//!
//! - **`config`** – The immutable [`BridgeConfig`] value (timeouts, ping
//!   interval, frame size cap), constructed once at startup and shared
//!   across sessions via `Arc`.
//!
//! - **`termination`** – [`TerminationReason`], the single tagged outcome
//!   recorded per session, with its failure/normal classification.
//!
//! - **`bridge`** – The orchestration itself: [`bridge::run_session`].
//!
//! This crate deliberately contains no socket, TLS, or CLI code. It is
//! generic over the endpoint traits so the concurrency and shutdown
//! behavior can be tested without a network.

pub mod bridge;
pub mod config;
pub mod endpoint;
pub mod termination;

// Re-export the most-used types at the crate root so callers can write
// `tunnel_core::BridgeConfig` instead of the longer module path.
pub use bridge::run_session;
pub use config::BridgeConfig;
pub use endpoint::{EndpointError, Frame, FrameReader, FrameWriter, StreamReader, StreamWriter};
pub use termination::TerminationReason;
