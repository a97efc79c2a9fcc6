//! Keepalive ping loop.
//!
//! CDNs and reverse proxies tear down connections that stay silent. The
//! keepalive loop sends a ping control frame at a fixed interval so the
//! framed connection always carries traffic, even while the game session
//! idles. It never reads: the matching pongs arrive on the framed read
//! path, where they refresh the rolling read deadline simply by being
//! read.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{interval, timeout};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::BridgeConfig;
use crate::endpoint::{EndpointError, FrameWriter};
use crate::termination::TerminationReason;

/// Sends a ping every `ping_interval` until cancelled or a send fails.
///
/// Shares the session's framed write mutex with the stream→frame
/// forwarder, so pings and data frames never interleave on the wire.
pub(crate) async fn run<W>(
    frame_tx: Arc<Mutex<W>>,
    config: Arc<BridgeConfig>,
    cancel: CancellationToken,
) -> TerminationReason
where
    W: FrameWriter,
{
    let mut ticker = interval(config.ping_interval);

    // The first tick resolves immediately; skip it so the first ping goes
    // out one full interval after the session starts.
    ticker.tick().await;

    loop {
        tokio::select! {
            () = cancel.cancelled() => return TerminationReason::Cancelled,
            _ = ticker.tick() => {}
        }

        let write = tokio::select! {
            () = cancel.cancelled() => return TerminationReason::Cancelled,
            write = async {
                let mut frames = frame_tx.lock().await;
                timeout(config.write_timeout, frames.send_ping()).await
            } => write,
        };

        match write {
            Ok(Ok(())) => debug!("keepalive ping sent"),
            Ok(Err(e)) => return TerminationReason::KeepaliveFailed(e),
            Err(_) => return TerminationReason::KeepaliveFailed(EndpointError::TimedOut),
        }
    }
}
