//! Domain layer for tunnel-relay.
//!
//! Pure configuration types for the two deployment roles. No sockets, no
//! async, no frameworks — the infrastructure layer populates these from
//! CLI arguments and consumes them.

pub mod config;

pub use config::{EgressConfig, IngressConfig};
