//! Byte-stream endpoint adapters for TCP connections.
//!
//! A `TcpStream` is split into owned halves so the bridge can move the
//! read half into the stream→frame forwarder while the write half sits
//! behind the session's write gate. The read half carries a fixed-size
//! buffer; its size is also the upper bound on outbound binary frame
//! payloads (see `BridgeConfig::stream_chunk_size`).

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use tunnel_core::{EndpointError, StreamReader, StreamWriter};

/// Read half of a TCP byte-stream endpoint.
pub struct TcpStreamReader {
    half: OwnedReadHalf,
    buf: Vec<u8>,
}

/// Write half of a TCP byte-stream endpoint.
pub struct TcpStreamWriter {
    half: OwnedWriteHalf,
}

/// Splits a connected `TcpStream` into bridge-ready endpoint halves.
///
/// `chunk_size` bounds each read and therefore each outbound frame
/// payload produced from this stream.
pub fn split_tcp(stream: TcpStream, chunk_size: usize) -> (TcpStreamReader, TcpStreamWriter) {
    let (read_half, write_half) = stream.into_split();
    (
        TcpStreamReader {
            half: read_half,
            buf: vec![0u8; chunk_size],
        },
        TcpStreamWriter { half: write_half },
    )
}

#[async_trait]
impl StreamReader for TcpStreamReader {
    async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>, EndpointError> {
        // A read of 0 bytes on a TCP socket means the peer closed its
        // write side; the trait reports that as end-of-stream, which the
        // bridge treats as a normal termination.
        let n = self.half.read(&mut self.buf).await?;
        if n == 0 {
            Ok(None)
        } else {
            Ok(Some(self.buf[..n].to_vec()))
        }
    }
}

#[async_trait]
impl StreamWriter for TcpStreamWriter {
    async fn write_all(&mut self, data: &[u8]) -> Result<(), EndpointError> {
        // write_all handles partial writes; important for payloads larger
        // than what the OS accepts in one call.
        self.half.write_all(data).await?;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), EndpointError> {
        self.half.shutdown().await?;
        Ok(())
    }
}
