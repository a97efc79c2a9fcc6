//! Bridge configuration.
//!
//! [`BridgeConfig`] is the single source of truth for every tunable the
//! session bridge consumes. It is constructed once at startup (from CLI
//! arguments in `tunnel-relay`, or from `Default` in tests), wrapped in
//! an `Arc`, and passed by reference into every session — there is no
//! global mutable state read from inside session tasks.

use std::time::Duration;

/// All runtime tuning for one session bridge.
///
/// The defaults mirror a deployment that tunnels a game server through an
/// idle-killing CDN: generous stream timeouts, a ping interval well under
/// typical intermediary idle limits, and a 64 KiB inbound frame cap.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Rolling read deadline on the byte-stream endpoint.
    ///
    /// Restarted on every successful read. A stream that stays silent for
    /// this long is treated as dead and the session terminates with a
    /// stream-read failure.
    pub stream_read_timeout: Duration,

    /// Rolling read deadline on the framed endpoint.
    ///
    /// Restarted on every frame read — keepalive pongs arrive through the
    /// same read path, so an otherwise idle but acknowledged session
    /// never trips this deadline.
    pub frame_read_timeout: Duration,

    /// Bound on every individual write, on either endpoint.
    pub write_timeout: Duration,

    /// Bound on the best-effort close handshake when the session ends.
    pub close_timeout: Duration,

    /// Interval between keepalive pings on the framed endpoint.
    ///
    /// Must sit comfortably under both `frame_read_timeout` and whatever
    /// idle cutoff the intermediaries apply.
    pub ping_interval: Duration,

    /// Maximum accepted inbound frame payload, in bytes.
    ///
    /// Enforced by the framed endpoint on reads only. Outbound frames are
    /// deliberately not capped against this value: the stream read buffer
    /// ([`Self::stream_chunk_size`], 8 KiB by default) keeps locally
    /// produced frames far below any sane peer limit, so the asymmetry is
    /// intentional rather than enforced.
    pub max_frame_payload: usize,

    /// Read buffer size for the byte-stream endpoint, which is also the
    /// upper bound on outbound binary frame payloads.
    pub stream_chunk_size: usize,

    /// When `true`, both forwarders hex-dump every relayed payload at
    /// `trace` level.
    pub log_payloads: bool,
}

impl Default for BridgeConfig {
    /// Returns the deployment defaults.
    ///
    /// | Field               | Default   |
    /// |---------------------|-----------|
    /// | stream_read_timeout | 120 s     |
    /// | frame_read_timeout  | 60 s      |
    /// | write_timeout       | 30 s      |
    /// | close_timeout       | 2 s       |
    /// | ping_interval       | 25 s      |
    /// | max_frame_payload   | 65536 B   |
    /// | stream_chunk_size   | 8192 B    |
    /// | log_payloads        | false     |
    fn default() -> Self {
        Self {
            stream_read_timeout: Duration::from_secs(120),
            frame_read_timeout: Duration::from_secs(60),
            write_timeout: Duration::from_secs(30),
            close_timeout: Duration::from_secs(2),
            ping_interval: Duration::from_secs(25),
            max_frame_payload: 64 * 1024,
            stream_chunk_size: 8 * 1024,
            log_payloads: false,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
