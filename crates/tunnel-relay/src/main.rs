//! ws-tunnel — entry point.
//!
//! Relays raw TCP sessions through WebSocket connections so game traffic
//! can traverse CDNs and reverse proxies that only carry WebSocket
//! traffic. Runs in one of two roles built on the same bridge engine:
//!
//! - **ingress**: accepts raw TCP from game clients, dials a WebSocket
//!   per connection.
//! - **egress**: accepts WebSocket connections (from the CDN), dials the
//!   real game server per connection.
//!
//! # Usage
//!
//! ```text
//! ws-tunnel ingress --listen 0.0.0.0:25565 --url wss://tunnel.example.com/ws
//! ws-tunnel egress  --listen 0.0.0.0:8080  --target 127.0.0.1:25565
//! ```
//!
//! Every flag can also be supplied via a `TUNNEL_*` environment
//! variable; CLI arguments take precedence. The log level is controlled
//! by `RUST_LOG` (default `info`); `--log-payloads` additionally
//! hex-dumps every relayed payload at `trace` level.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tunnel_core::BridgeConfig;
use tunnel_relay::domain::{EgressConfig, IngressConfig};
use tunnel_relay::infrastructure::{run_egress, run_ingress};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Relays raw TCP sessions through WebSocket connections.
#[derive(Debug, Parser)]
#[command(
    name = "ws-tunnel",
    about = "TCP-over-WebSocket relay for traffic that must traverse CDNs",
    version
)]
struct Cli {
    #[command(subcommand)]
    role: Role,

    /// Maximum accepted inbound WebSocket frame payload, in bytes.
    #[arg(long, default_value_t = 65_536, env = "TUNNEL_MAX_FRAME_PAYLOAD", global = true)]
    max_frame_payload: usize,

    /// Keepalive ping interval in seconds.
    ///
    /// Must stay under the intermediaries' idle cutoff and under
    /// --frame-read-timeout.
    #[arg(long, default_value_t = 25, env = "TUNNEL_PING_INTERVAL", global = true)]
    ping_interval: u64,

    /// Rolling read deadline on the raw TCP side, in seconds.
    #[arg(long, default_value_t = 120, env = "TUNNEL_STREAM_READ_TIMEOUT", global = true)]
    stream_read_timeout: u64,

    /// Rolling read deadline on the WebSocket side, in seconds.
    ///
    /// Refreshed by keepalive pongs, so an idle but healthy session
    /// never trips it.
    #[arg(long, default_value_t = 60, env = "TUNNEL_FRAME_READ_TIMEOUT", global = true)]
    frame_read_timeout: u64,

    /// Per-write deadline on either side, in seconds.
    #[arg(long, default_value_t = 30, env = "TUNNEL_WRITE_TIMEOUT", global = true)]
    write_timeout: u64,

    /// Bound on the close handshake when a session ends, in seconds.
    #[arg(long, default_value_t = 2, env = "TUNNEL_CLOSE_TIMEOUT", global = true)]
    close_timeout: u64,

    /// Hex-dump every relayed payload at trace level.
    #[arg(long, env = "TUNNEL_LOG_PAYLOADS", global = true)]
    log_payloads: bool,
}

#[derive(Debug, Subcommand)]
enum Role {
    /// Accept raw TCP connections and relay each through a WebSocket.
    Ingress {
        /// TCP listen address for game clients.
        #[arg(long, default_value = "0.0.0.0:25565", env = "TUNNEL_LISTEN")]
        listen: SocketAddr,

        /// WebSocket URL to dial per connection (the CDN hostname).
        #[arg(long, env = "TUNNEL_URL")]
        url: String,

        /// Skip TLS certificate verification when dialing wss:// URLs.
        #[arg(long, env = "TUNNEL_INSECURE")]
        insecure: bool,

        /// WebSocket handshake timeout in seconds.
        #[arg(long, default_value_t = 10, env = "TUNNEL_HANDSHAKE_TIMEOUT")]
        handshake_timeout: u64,
    },

    /// Accept WebSocket connections and relay each to a raw TCP target.
    Egress {
        /// WebSocket listen address (behind the CDN or reverse proxy).
        #[arg(long, default_value = "0.0.0.0:8080", env = "TUNNEL_LISTEN")]
        listen: SocketAddr,

        /// Raw TCP destination — the real game server.
        #[arg(long, default_value = "127.0.0.1:25565", env = "TUNNEL_TARGET")]
        target: SocketAddr,
    },
}

impl Cli {
    /// Converts the shared tuning flags into a [`BridgeConfig`].
    fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            stream_read_timeout: Duration::from_secs(self.stream_read_timeout),
            frame_read_timeout: Duration::from_secs(self.frame_read_timeout),
            write_timeout: Duration::from_secs(self.write_timeout),
            close_timeout: Duration::from_secs(self.close_timeout),
            ping_interval: Duration::from_secs(self.ping_interval),
            max_frame_payload: self.max_frame_payload,
            stream_chunk_size: BridgeConfig::default().stream_chunk_size,
            log_payloads: self.log_payloads,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controls the log level; fall back to `info` when the
    // variable is absent or invalid.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let bridge = Arc::new(cli.bridge_config());

    // Ctrl+C clears this flag; the accept loops poll it every 200 ms and
    // exit cleanly.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C — initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    match cli.role {
        Role::Ingress {
            listen,
            url,
            insecure,
            handshake_timeout,
        } => {
            let config = IngressConfig {
                listen_addr: listen,
                url,
                insecure,
                handshake_timeout: Duration::from_secs(handshake_timeout),
            };
            run_ingress(config, bridge, running).await?;
        }
        Role::Egress { listen, target } => {
            let config = EgressConfig {
                listen_addr: listen,
                target_addr: target,
            };
            run_egress(config, bridge, running).await?;
        }
    }

    info!("ws-tunnel stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
