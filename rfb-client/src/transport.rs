//! TCP transport for VNC connections.
//!
//! A [`Transport`] owns the socket split into buffered RFB streams. Dropping
//! it closes the connection.
//!
//! # Examples
//!
//! ```no_run
//! use rfb_client::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), rfb_client::RfbError> {
//! let mut transport = Transport::connect("localhost", 5900, Duration::from_secs(10)).await?;
//! let banner = transport.input().read_exact(12).await?;
//! # Ok(())
//! # }
//! ```

use crate::errors::RfbError;
use rfb_protocol::io::{RfbInStream, RfbOutStream};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// A connected TCP session with buffered input and output streams.
pub struct Transport {
    input: RfbInStream<OwnedReadHalf>,
    output: RfbOutStream<OwnedWriteHalf>,
    peer: SocketAddr,
}

impl Transport {
    /// Connect to a VNC server via plain TCP.
    ///
    /// `timeout` bounds the connection attempt. TCP_NODELAY is enabled for
    /// low-latency input events.
    ///
    /// # Errors
    ///
    /// Returns [`RfbError::Timeout`] if the connection is not established in
    /// time and [`RfbError::Connection`] if DNS resolution or the connect
    /// fails.
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, RfbError> {
        let addr = format!("{}:{}", host, port);
        let stream = tokio::time::timeout(timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| RfbError::Timeout(timeout))?
            .map_err(|e| RfbError::Connection(format!("Failed to connect to {}: {}", addr, e)))?;

        stream.set_nodelay(true).map_err(|e| {
            RfbError::Connection(format!("Failed to set TCP_NODELAY: {}", e))
        })?;

        let peer = stream
            .peer_addr()
            .map_err(|e| RfbError::Connection(format!("Failed to read peer address: {}", e)))?;
        // Log local and remote addresses for correlation with server logs
        match stream.local_addr() {
            Ok(local) => tracing::info!("Connected via TCP: local={} -> remote={}", local, peer),
            Err(_) => tracing::info!("Connected to {} via plain TCP", peer),
        }

        let (read, write) = stream.into_split();
        Ok(Self {
            input: RfbInStream::new(read),
            output: RfbOutStream::new(write),
            peer,
        })
    }

    /// Address of the server.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Install or clear the deadline for each read.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.input.set_read_timeout(timeout);
    }

    /// The input stream.
    pub fn input(&mut self) -> &mut RfbInStream<OwnedReadHalf> {
        &mut self.input
    }

    /// The output stream.
    pub fn output(&mut self) -> &mut RfbOutStream<OwnedWriteHalf> {
        &mut self.output
    }

    /// Both streams at once, for exchanges that read and write.
    pub fn streams(
        &mut self,
    ) -> (
        &mut RfbInStream<OwnedReadHalf>,
        &mut RfbOutStream<OwnedWriteHalf>,
    ) {
        (&mut self.input, &mut self.output)
    }
}
