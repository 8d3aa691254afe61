//! RFB (Remote Framebuffer) protocol implementation.
//!
//! This crate provides the wire layer for VNC client connections: byte-order
//! codecs, buffered I/O streams, message records, the opening handshake, and
//! the error type shared by every layer above it.
//!
//! # Modules
//!
//! - [`codec`] - Big-endian primitives and the `WireEncode`/`WireDecode` traits
//! - [`io`] - Buffered I/O streams (RfbInStream, RfbOutStream)
//! - [`messages`] - Client and server message records
//! - [`handshake`] - Version and security negotiation, ClientInit/ServerInit
//! - [`errors`] - `RfbError` and its coarse classification
//!
//! # Examples
//!
//! ```no_run
//! use rfb_protocol::handshake;
//! use rfb_protocol::{RfbInStream, RfbOutStream};
//! use tokio::net::TcpStream;
//!
//! # async fn example() -> Result<(), rfb_protocol::RfbError> {
//! let (reader, writer) = TcpStream::connect("localhost:5900").await?.into_split();
//! let mut input = RfbInStream::new(reader);
//! let mut output = RfbOutStream::new(writer);
//!
//! let version = handshake::negotiate_version(&mut input, &mut output).await?;
//! println!("Speaking RFB {}", version);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod errors;
pub mod handshake;
pub mod io;
pub mod messages;

// Re-export commonly used types
pub use codec::{CodecError, WireDecode, WireEncode};
pub use errors::{ErrorClass, RfbError};
pub use handshake::{NegotiatedProtocol, ProtocolVersion};
pub use io::{RfbInStream, RfbOutStream};
