//! tunnel-relay library crate.
//!
//! Everything around the session bridge: the role drivers that accept
//! and dial connections, the concrete TCP and WebSocket endpoint
//! adapters, and the role configuration types. The bridge engine itself
//! lives in `tunnel-core`; this crate only constructs connected endpoint
//! pairs and hands them to it.
//!
//! # Layers
//!
//! ```text
//! game client (raw TCP)          CDN / reverse proxy (WebSocket only)
//!        ↕                                  ↕
//! [ws-tunnel ingress]  ←— WebSocket —→  [ws-tunnel egress]
//!                                            ↕
//!                                     game server (raw TCP)
//! ```
//!
//! - `domain/` – role configuration (listen/dial addresses, TLS opt-out).
//! - `infrastructure/` – accept loops, endpoint adapters, per-session
//!   task spawning.
//!
//! CLI parsing and logging setup live in `main.rs`.

/// Domain layer: role configuration types (no I/O).
pub mod domain;

/// Infrastructure layer: accept loops and endpoint adapters.
pub mod infrastructure;
