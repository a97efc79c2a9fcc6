//! Framed endpoint adapters for WebSocket connections.
//!
//! Wraps the split halves of a tungstenite `WebSocketStream` in the
//! `tunnel-core` frame traits. The adapters are generic over the
//! underlying transport so the same code serves the ingress side
//! (`MaybeTlsStream<TcpStream>` from a dial) and the egress side (a
//! plain accepted `TcpStream`).
//!
//! The inbound frame size cap is enforced by tungstenite itself via
//! [`websocket_config`]; the library's capacity error is mapped to the
//! distinct [`EndpointError::FrameTooLarge`] so the bridge reports it as
//! a frame-read failure.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::error::CapacityError;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, WebSocketConfig};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::WebSocketStream;

use tunnel_core::{EndpointError, Frame, FrameReader, FrameWriter};

/// Builds the tungstenite configuration for one session.
///
/// Both the message cap and the frame cap are set to the configured
/// maximum inbound payload; an oversized inbound frame then fails the
/// read instead of being buffered.
pub fn websocket_config(max_frame_payload: usize) -> WebSocketConfig {
    let mut config = WebSocketConfig::default();
    config.max_message_size = Some(max_frame_payload);
    config.max_frame_size = Some(max_frame_payload);
    config
}

/// Read half of a WebSocket framed endpoint.
pub struct WsFrameReader<S> {
    inner: SplitStream<WebSocketStream<S>>,
}

/// Write half of a WebSocket framed endpoint.
pub struct WsFrameWriter<S> {
    inner: SplitSink<WebSocketStream<S>, Message>,
}

/// Splits a connected WebSocket into bridge-ready endpoint halves.
pub fn split_websocket<S>(ws: WebSocketStream<S>) -> (WsFrameReader<S>, WsFrameWriter<S>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (sink, stream) = ws.split();
    (WsFrameReader { inner: stream }, WsFrameWriter { inner: sink })
}

#[async_trait]
impl<S> FrameReader for WsFrameReader<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn read_frame(&mut self) -> Result<Frame, EndpointError> {
        loop {
            match self.inner.next().await {
                Some(Ok(msg)) => {
                    if let Some(frame) = map_message(msg) {
                        return Ok(frame);
                    }
                    // Raw passthrough frames don't surface from reads;
                    // if one ever does, skip it.
                }
                // The close handshake already completed; report it the
                // same way as a close frame.
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => {
                    return Ok(Frame::Close)
                }
                Some(Err(e)) => return Err(map_ws_error(e)),
                // Stream exhausted without a close frame: the peer is gone.
                None => return Ok(Frame::Close),
            }
        }
    }
}

#[async_trait]
impl<S> FrameWriter for WsFrameWriter<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn send_binary(&mut self, payload: Vec<u8>) -> Result<(), EndpointError> {
        self.inner
            .send(Message::Binary(payload))
            .await
            .map_err(map_ws_error)
    }

    async fn send_ping(&mut self) -> Result<(), EndpointError> {
        self.inner
            .send(Message::Ping(Vec::new()))
            .await
            .map_err(map_ws_error)
    }

    async fn send_close(&mut self) -> Result<(), EndpointError> {
        self.inner
            .send(Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "".into(),
            })))
            .await
            .map_err(map_ws_error)
    }

    async fn close(&mut self) -> Result<(), EndpointError> {
        self.inner.close().await.map_err(map_ws_error)
    }
}

// ── Mapping ───────────────────────────────────────────────────────────────────

/// Maps a tungstenite message to the bridge's frame model.
///
/// Returns `None` for the raw-frame variant, which never surfaces from a
/// normal read.
fn map_message(msg: Message) -> Option<Frame> {
    match msg {
        Message::Binary(payload) => Some(Frame::Binary(payload)),
        Message::Text(text) => Some(Frame::Text(text)),
        Message::Ping(payload) => Some(Frame::Ping(payload)),
        Message::Pong(payload) => Some(Frame::Pong(payload)),
        Message::Close(_) => Some(Frame::Close),
        Message::Frame(_) => None,
    }
}

/// Maps a tungstenite error to the bridge's endpoint error.
fn map_ws_error(err: WsError) -> EndpointError {
    match err {
        WsError::Capacity(CapacityError::MessageTooLong { size, max_size }) => {
            EndpointError::FrameTooLarge {
                size,
                limit: max_size,
            }
        }
        WsError::Io(e) => EndpointError::Io(e),
        other => EndpointError::Transport(other.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
