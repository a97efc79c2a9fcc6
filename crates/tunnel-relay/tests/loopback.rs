//! End-to-end round trip over loopback sockets.
//!
//! Wires the full deployment shape on 127.0.0.1 with ephemeral ports:
//!
//! ```text
//! test client ── TCP ──> ingress ── WebSocket ──> egress ── TCP ──> echo
//! ```
//!
//! and verifies bytes survive the double relay intact, in both
//! directions, across multiple writes.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use tunnel_core::BridgeConfig;
use tunnel_relay::domain::{EgressConfig, IngressConfig};
use tunnel_relay::infrastructure::egress::serve_egress;
use tunnel_relay::infrastructure::ingress::serve_ingress;

/// Spawns a TCP echo server and returns its address.
async fn spawn_echo_server() -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let (mut rx, mut tx) = stream.split();
                let _ = tokio::io::copy(&mut rx, &mut tx).await;
            });
        }
    });
    addr
}

#[tokio::test]
async fn test_bytes_round_trip_through_both_relays() {
    let echo_addr = spawn_echo_server().await;

    let running = Arc::new(AtomicBool::new(true));
    let bridge = Arc::new(BridgeConfig::default());

    // Egress: WebSocket listener in front of the echo server.
    let egress_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let egress_addr = egress_listener.local_addr().unwrap();
    let egress_config = Arc::new(EgressConfig {
        listen_addr: egress_addr,
        target_addr: echo_addr,
    });
    tokio::spawn(serve_egress(
        egress_listener,
        egress_config,
        Arc::clone(&bridge),
        Arc::clone(&running),
    ));

    // Ingress: raw TCP listener dialing the egress over plain ws://.
    let ingress_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let ingress_addr = ingress_listener.local_addr().unwrap();
    let ingress_config = Arc::new(IngressConfig {
        listen_addr: ingress_addr,
        url: format!("ws://{egress_addr}"),
        insecure: false,
        handshake_timeout: Duration::from_secs(10),
    });
    tokio::spawn(serve_ingress(
        ingress_listener,
        ingress_config,
        Arc::clone(&bridge),
        Arc::clone(&running),
    ));

    // Act: write through the tunnel and read the echo back, twice, to
    // exercise both directions across more than one frame.
    let mut client = TcpStream::connect(ingress_addr).await.unwrap();

    for payload in [&b"ping through the tunnel"[..], &b"second volley"[..]] {
        client.write_all(payload).await.unwrap();

        let mut echoed = vec![0u8; payload.len()];
        timeout(Duration::from_secs(10), client.read_exact(&mut echoed))
            .await
            .expect("echo timed out")
            .expect("echo read failed");
        assert_eq!(echoed, payload);
    }

    // Closing the client must unwind both sessions without hanging the
    // accept loops.
    drop(client);
    running.store(false, Ordering::Relaxed);
}

#[tokio::test]
async fn test_server_initiated_bytes_reach_the_client() {
    // A server that pushes a banner immediately on connect, before the
    // client sends anything — the frame→stream direction must not wait
    // on client traffic.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let banner_addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let _ = stream.write_all(b"welcome!").await;
            });
        }
    });

    let running = Arc::new(AtomicBool::new(true));
    let bridge = Arc::new(BridgeConfig::default());

    let egress_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let egress_addr = egress_listener.local_addr().unwrap();
    tokio::spawn(serve_egress(
        egress_listener,
        Arc::new(EgressConfig {
            listen_addr: egress_addr,
            target_addr: banner_addr,
        }),
        Arc::clone(&bridge),
        Arc::clone(&running),
    ));

    let ingress_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let ingress_addr = ingress_listener.local_addr().unwrap();
    tokio::spawn(serve_ingress(
        ingress_listener,
        Arc::new(IngressConfig {
            listen_addr: ingress_addr,
            url: format!("ws://{egress_addr}"),
            insecure: false,
            handshake_timeout: Duration::from_secs(10),
        }),
        Arc::clone(&bridge),
        Arc::clone(&running),
    ));

    let mut client = TcpStream::connect(ingress_addr).await.unwrap();
    let mut banner = [0u8; 8];
    timeout(Duration::from_secs(10), client.read_exact(&mut banner))
        .await
        .expect("banner timed out")
        .expect("banner read failed");
    assert_eq!(&banner, b"welcome!");

    running.store(false, Ordering::Relaxed);
}
