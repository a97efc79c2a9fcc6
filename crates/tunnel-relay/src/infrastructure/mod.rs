//! Infrastructure layer for tunnel-relay.
//!
//! All I/O lives here:
//!
//! - `tcp` – byte-stream endpoint adapters over split `TcpStream` halves.
//! - `ws` – framed endpoint adapters over split tungstenite halves.
//! - `ingress` – accept raw TCP, dial WebSocket, bridge.
//! - `egress` – accept WebSocket, dial raw TCP, bridge.
//!
//! The accept loops never block on a session: each accepted connection
//! is handed to its own Tokio task, and sessions are fully independent.

pub mod egress;
pub mod ingress;
pub mod tcp;
pub mod ws;

// Re-export the role entry points so `main.rs` can call them concisely.
pub use egress::run_egress;
pub use ingress::run_ingress;
