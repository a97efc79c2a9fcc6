//! Role configuration.
//!
//! One struct per deployment role. Bridge-level tuning (timeouts, ping
//! interval, frame cap) lives in [`tunnel_core::BridgeConfig`]; these
//! structs only describe where each role listens and dials.
//!
//! Both are built once at startup from CLI arguments and shared across
//! sessions via `Arc` — no global mutable state.

use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for the ingress role: accept raw TCP, dial WebSocket.
#[derive(Debug, Clone)]
pub struct IngressConfig {
    /// Address the raw TCP listener binds to. Game clients connect here.
    pub listen_addr: SocketAddr,

    /// WebSocket URL dialed once per accepted connection, e.g.
    /// `wss://tunnel.example.com/ws`. This is the hostname the CDN or
    /// reverse proxy routes to the egress relay.
    pub url: String,

    /// Skip TLS certificate verification when dialing `wss://` URLs.
    ///
    /// Off by default. Only useful against self-signed staging
    /// endpoints; never enable it toward an untrusted network path.
    pub insecure: bool,

    /// Bound on the WebSocket upgrade handshake when dialing.
    pub handshake_timeout: Duration,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            // The default game port (the original deployment fronted a
            // Minecraft server).
            listen_addr: "0.0.0.0:25565".parse().unwrap(),
            url: "wss://tunnel.example.com/ws".to_string(),
            insecure: false,
            handshake_timeout: Duration::from_secs(10),
        }
    }
}

/// Configuration for the egress role: accept WebSocket, dial raw TCP.
#[derive(Debug, Clone)]
pub struct EgressConfig {
    /// Address the WebSocket listener binds to. The CDN or reverse proxy
    /// forwards upgrade requests here.
    pub listen_addr: SocketAddr,

    /// Raw TCP destination dialed once per accepted WebSocket — the real
    /// game server.
    pub target_addr: SocketAddr,
}

impl Default for EgressConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".parse().unwrap(),
            target_addr: "127.0.0.1:25565".parse().unwrap(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingress_default_listen_port_is_25565() {
        let cfg = IngressConfig::default();
        assert_eq!(cfg.listen_addr.port(), 25565);
    }

    #[test]
    fn test_ingress_default_is_secure() {
        // Certificate verification must be opt-out, not opt-in.
        let cfg = IngressConfig::default();
        assert!(!cfg.insecure);
    }

    #[test]
    fn test_ingress_default_handshake_timeout_is_10s() {
        let cfg = IngressConfig::default();
        assert_eq!(cfg.handshake_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_egress_default_listen_port_is_8080() {
        let cfg = EgressConfig::default();
        assert_eq!(cfg.listen_addr.port(), 8080);
    }

    #[test]
    fn test_egress_default_target_is_local_game_port() {
        let cfg = EgressConfig::default();
        assert_eq!(cfg.target_addr.to_string(), "127.0.0.1:25565");
    }
}
