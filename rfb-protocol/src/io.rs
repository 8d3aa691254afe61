//! Buffered I/O streams for RFB protocol communication.
//!
//! [`RfbInStream`] reads fixed-size records out of an internal buffer that is
//! refilled from the socket on demand; [`RfbOutStream`] accumulates encoded
//! records and sends them on [`flush`](RfbOutStream::flush). Byte order lives
//! in [`crate::codec`]; these streams only move bytes.
//!
//! # Examples
//!
//! ```no_run
//! use rfb_protocol::io::{RfbInStream, RfbOutStream};
//! use rfb_protocol::messages::FramebufferUpdateRequest;
//! use tokio::net::TcpStream;
//!
//! # async fn example() -> Result<(), rfb_protocol::RfbError> {
//! let socket = TcpStream::connect("localhost:5900").await?;
//! let (reader, writer) = socket.into_split();
//!
//! let mut input = RfbInStream::new(reader);
//! let banner = input.read_exact(12).await?;
//!
//! let mut output = RfbOutStream::new(writer);
//! output.write_record(&FramebufferUpdateRequest::full(false, 1024, 768));
//! output.flush().await?;
//! # Ok(())
//! # }
//! ```

use crate::codec::{WireDecode, WireEncode};
use crate::errors::RfbError;
use bytes::{Buf, Bytes, BytesMut};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Buffered input stream for reading RFB protocol data.
///
/// An optional read timeout bounds every refill of the buffer. The handshake
/// runs with a timeout installed; the update pump runs without one and relies
/// on [`poll_readable`](Self::poll_readable) instead.
pub struct RfbInStream<R> {
    reader: R,
    buffer: BytesMut,
    read_timeout: Option<Duration>,
}

impl<R: AsyncRead + Unpin> RfbInStream<R> {
    /// Create a new input stream with default buffer size (8KB).
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, 8192)
    }

    /// Create a new input stream with specified buffer capacity.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            buffer: BytesMut::with_capacity(capacity),
            read_timeout: None,
        }
    }

    /// Install or clear the deadline applied to each socket read.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.read_timeout = timeout;
    }

    /// Perform one read from the socket into the buffer.
    async fn fill(&mut self) -> Result<usize, RfbError> {
        let n = match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, self.reader.read_buf(&mut self.buffer))
                .await
                .map_err(|_| RfbError::Timeout(limit))??,
            None => self.reader.read_buf(&mut self.buffer).await?,
        };
        Ok(n)
    }

    /// Ensure at least `n` bytes are available in the buffer.
    async fn ensure_bytes(&mut self, n: usize) -> Result<(), RfbError> {
        while self.buffer.len() < n {
            if self.fill().await? == 0 {
                return Err(RfbError::UnexpectedEof {
                    expected: n,
                    received: self.buffer.len(),
                });
            }
        }
        Ok(())
    }

    /// Read exactly `n` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RfbError::UnexpectedEof`] if the peer closes the stream
    /// before `n` bytes arrive.
    pub async fn read_exact(&mut self, n: usize) -> Result<Bytes, RfbError> {
        self.ensure_bytes(n).await?;
        Ok(self.buffer.split_to(n).freeze())
    }

    /// Read and decode one fixed-size record.
    ///
    /// ```no_run
    /// # use rfb_protocol::io::RfbInStream;
    /// # use rfb_protocol::messages::Rectangle;
    /// # async fn example<R: tokio::io::AsyncRead + Unpin>(mut stream: RfbInStream<R>) -> Result<(), rfb_protocol::RfbError> {
    /// let message_type: u8 = stream.read_record().await?;
    /// let rect: Rectangle = stream.read_record().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn read_record<T: WireDecode>(&mut self) -> Result<T, RfbError> {
        let mut bytes = self.read_exact(T::SIZE).await?;
        Ok(T::decode(&mut bytes)?)
    }

    /// Read and discard `n` bytes.
    ///
    /// Bytes are dropped as they arrive, so the buffer never holds more than
    /// one socket read of the skipped data.
    pub async fn skip(&mut self, n: usize) -> Result<(), RfbError> {
        let mut remaining = n;
        loop {
            let chunk = remaining.min(self.buffer.len());
            self.buffer.advance(chunk);
            remaining -= chunk;
            if remaining == 0 {
                return Ok(());
            }
            if self.fill().await? == 0 {
                return Err(RfbError::UnexpectedEof {
                    expected: n,
                    received: n - remaining,
                });
            }
        }
    }

    /// Wait up to `timeout` for at least one byte, without consuming it.
    ///
    /// Returns `Ok(false)` when the deadline passes with nothing to read.
    ///
    /// # Errors
    ///
    /// Returns [`RfbError::UnexpectedEof`] if the peer has closed the stream.
    pub async fn poll_readable(&mut self, timeout: Duration) -> Result<bool, RfbError> {
        if !self.buffer.is_empty() {
            return Ok(true);
        }
        match tokio::time::timeout(timeout, self.reader.read_buf(&mut self.buffer)).await {
            Err(_) => Ok(false),
            Ok(Ok(0)) => Err(RfbError::UnexpectedEof {
                expected: 1,
                received: 0,
            }),
            Ok(Ok(_)) => Ok(true),
            Ok(Err(e)) => Err(e.into()),
        }
    }

    /// Get the number of bytes currently available in the buffer.
    pub fn available(&self) -> usize {
        self.buffer.len()
    }
}

/// Buffered output stream for writing RFB protocol data.
///
/// Records are encoded into an internal buffer and only sent when
/// [`flush()`](Self::flush) is called. Dropping the stream without flushing
/// loses any buffered data.
pub struct RfbOutStream<W> {
    writer: W,
    buffer: BytesMut,
}

impl<W: AsyncWrite + Unpin> RfbOutStream<W> {
    /// Create a new output stream with default buffer size (8KB).
    pub fn new(writer: W) -> Self {
        Self::with_capacity(writer, 8192)
    }

    /// Create a new output stream with specified buffer capacity.
    pub fn with_capacity(writer: W, capacity: usize) -> Self {
        Self {
            writer,
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Encode a record into the buffer.
    pub fn write_record<T: WireEncode + ?Sized>(&mut self, record: &T) {
        record.encode(&mut self.buffer);
    }

    /// Append raw bytes (the version banner) to the buffer.
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Encode a record and flush it immediately.
    pub async fn send<T: WireEncode + ?Sized>(&mut self, record: &T) -> Result<(), RfbError> {
        self.write_record(record);
        self.flush().await
    }

    /// Flush all buffered data to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or if the underlying writer's
    /// `flush()` method returns an error.
    pub async fn flush(&mut self) -> Result<(), RfbError> {
        if !self.buffer.is_empty() {
            self.writer.write_all(&self.buffer).await?;
            self.buffer.clear();
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Get the number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}
