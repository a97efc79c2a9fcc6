//! Ingress role driver: accept raw TCP, dial WebSocket, bridge.
//!
//! One session per accepted connection. The accept loop itself never
//! blocks on a session; each connection is handed to a dedicated Tokio
//! task, so a slow WebSocket dial for one client never delays the next
//! accept.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{connect_async_tls_with_config, Connector};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use tunnel_core::{run_session, BridgeConfig, TerminationReason};

use crate::domain::IngressConfig;
use crate::infrastructure::tcp::split_tcp;
use crate::infrastructure::ws::{split_websocket, websocket_config};

/// Binds the raw TCP listener and accepts game clients until `running`
/// is cleared.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound.
pub async fn run_ingress(
    config: IngressConfig,
    bridge: Arc<BridgeConfig>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind ingress listener on {}", config.listen_addr))?;

    info!(
        "ingress listening on {}, relaying to {}",
        config.listen_addr, config.url
    );

    serve_ingress(listener, Arc::new(config), bridge, running).await
}

/// The ingress accept loop over an already-bound listener.
///
/// Split out from [`run_ingress`] so tests can bind an ephemeral port
/// themselves.
pub async fn serve_ingress(
    listener: TcpListener,
    config: Arc<IngressConfig>,
    bridge: Arc<BridgeConfig>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping ingress accept loop");
            break;
        }

        // A short timeout on accept() lets the loop poll the shutdown
        // flag even when no clients are connecting.
        match timeout(Duration::from_millis(200), listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                let config = Arc::clone(&config);
                let bridge = Arc::clone(&bridge);
                tokio::spawn(async move {
                    handle_ingress_conn(stream, peer_addr, config, bridge).await;
                });
            }
            Ok(Err(e)) => {
                // Transient accept error (e.g. fd exhaustion); keep serving.
                error!("ingress accept error: {e}");
            }
            Err(_) => {
                // No connection within the poll window.
            }
        }
    }

    Ok(())
}

/// Per-connection task entry point: runs the session and logs its outcome.
async fn handle_ingress_conn(
    stream: TcpStream,
    peer_addr: SocketAddr,
    config: Arc<IngressConfig>,
    bridge: Arc<BridgeConfig>,
) {
    let session_id = Uuid::new_v4();
    info!("session {session_id}: raw connection from {peer_addr}");

    match run_ingress_session(stream, session_id, &config, bridge).await {
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

/// Dials the WebSocket endpoint and runs the bridge for one connection.
///
/// # Errors
///
/// Returns an error if socket options cannot be set, the TLS connector
/// cannot be built, or the WebSocket handshake fails or times out. Once
/// the bridge starts, its outcome is returned as a [`TerminationReason`]
/// instead.
async fn run_ingress_session(
    stream: TcpStream,
    session_id: Uuid,
    config: &IngressConfig,
    bridge: Arc<BridgeConfig>,
) -> anyhow::Result<TerminationReason> {
    // Game traffic is latency-sensitive; don't batch small writes.
    stream
        .set_nodelay(true)
        .context("failed to set TCP_NODELAY")?;

    let connector = if config.insecure {
        let tls = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .context("failed to build TLS connector")?;
        Some(Connector::NativeTls(tls))
    } else {
        None
    };

    let (ws, _response) = timeout(
        config.handshake_timeout,
        connect_async_tls_with_config(
            config.url.as_str(),
            Some(websocket_config(bridge.max_frame_payload)),
            false,
            connector,
        ),
    )
    .await
    .context("WebSocket handshake timed out")?
    .with_context(|| format!("failed to dial {}", config.url))?;

    debug!("session {session_id}: WebSocket established to {}", config.url);

    let (stream_rx, stream_tx) = split_tcp(stream, bridge.stream_chunk_size);
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
