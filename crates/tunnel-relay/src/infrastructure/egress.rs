//! Egress role driver: accept WebSocket, dial raw TCP, bridge.
//!
//! The mirror image of the ingress driver. The CDN or reverse proxy
//! forwards WebSocket upgrades here; each upgraded connection gets its
//! own TCP connection to the real game server and its own bridge.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::accept_async_with_config;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use tunnel_core::{run_session, BridgeConfig, TerminationReason};

use crate::domain::EgressConfig;
use crate::infrastructure::tcp::split_tcp;
use crate::infrastructure::ws::{split_websocket, websocket_config};

/// Binds the WebSocket listener and accepts tunnel connections until
/// `running` is cleared.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound.
pub async fn run_egress(
    config: EgressConfig,
    bridge: Arc<BridgeConfig>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind egress listener on {}", config.listen_addr))?;

    info!(
        "egress listening on {}, relaying to {}",
        config.listen_addr, config.target_addr
    );

    serve_egress(listener, Arc::new(config), bridge, running).await
}

/// The egress accept loop over an already-bound listener.
pub async fn serve_egress(
    listener: TcpListener,
    config: Arc<EgressConfig>,
    bridge: Arc<BridgeConfig>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping egress accept loop");
            break;
        }

        match timeout(Duration::from_millis(200), listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                let config = Arc::clone(&config);
                let bridge = Arc::clone(&bridge);
                tokio::spawn(async move {
                    handle_egress_conn(stream, peer_addr, config, bridge).await;
                });
            }
            Ok(Err(e)) => {
                error!("egress accept error: {e}");
            }
            Err(_) => {
                // No connection within the poll window.
            }
        }
    }

    Ok(())
}

/// Per-connection task entry point: runs the session and logs its outcome.
async fn handle_egress_conn(
    stream: TcpStream,
    peer_addr: SocketAddr,
    config: Arc<EgressConfig>,
    bridge: Arc<BridgeConfig>,
) {
    let session_id = Uuid::new_v4();
    info!("session {session_id}: WebSocket connection from {peer_addr}");

    match run_egress_session(stream, session_id, &config, bridge).await {
        Ok(reason) if reason.is_failure() => {
            warn!("session {session_id} ({peer_addr}) failed: {reason}");
        }
        Ok(reason) => {
            info!("session {session_id} ({peer_addr}) closed: {reason}");
        }
        Err(e) => {
            warn!("session {session_id} ({peer_addr}) setup failed: {e:#}");
        }
    }
}

/// Completes the WebSocket upgrade, dials the target, and runs the bridge.
///
/// # Errors
///
/// Returns an error if the upgrade handshake fails or the target cannot
/// be dialed. Once the bridge starts, its outcome is returned as a
/// [`TerminationReason`] instead.
async fn run_egress_session(
    stream: TcpStream,
    session_id: Uuid,
    config: &EgressConfig,
    bridge: Arc<BridgeConfig>,
) -> anyhow::Result<TerminationReason> {
    let ws = accept_async_with_config(stream, Some(websocket_config(bridge.max_frame_payload)))
        .await
        .context("WebSocket upgrade handshake failed")?;

    let target = TcpStream::connect(config.target_addr)
        .await
        .with_context(|| format!("failed to connect to target {}", config.target_addr))?;
    target
        .set_nodelay(true)
        .context("failed to set TCP_NODELAY")?;

    debug!(
        "session {session_id}: connected to target {}",
        config.target_addr
    );

    let (stream_rx, stream_tx) = split_tcp(target, bridge.stream_chunk_size);
    let (frame_rx, frame_tx) = split_websocket(ws);

    Ok(run_session(
        stream_rx,
        stream_tx,
        frame_rx,
        frame_tx,
        bridge,
        CancellationToken::new(),
    )
    .await)
}
