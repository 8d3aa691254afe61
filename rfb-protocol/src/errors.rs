//! Error types shared by every layer of the RFB client.

use crate::codec::CodecError;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to an RFB server.
///
/// Every error aborts the operation in progress. Errors raised during login
/// additionally release the transport.
#[derive(Debug, Error)]
pub enum RfbError {
    /// Transport-level error (socket read/write failure).
    #[error("Transport error: {0}")]
    Io(#[from] io::Error),

    /// Connection could not be established.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Connect or handshake read exceeded its deadline.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// An operation that needs a live session was called before login.
    #[error("Session is not connected")]
    NotConnected,

    /// A fixed-size read returned fewer bytes than required.
    #[error("Unexpected end of stream: expected {expected} bytes, got {received}")]
    UnexpectedEof {
        /// Bytes the read required.
        expected: usize,
        /// Bytes available when the peer closed the stream.
        received: usize,
    },

    /// A record could not be decoded from the bytes provided.
    #[error("Framing error: {0}")]
    Codec(#[from] CodecError),

    /// Malformed or unexpected protocol data.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Server speaks a protocol version older than 3.3.
    #[error("Unsupported RFB version {server} (minimum 003.003)")]
    UnsupportedVersion {
        /// Version announced by the server, as `ddd.ddd`.
        server: String,
    },

    /// Security negotiation failed or needs an unimplemented credential path.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Pixel format, colour mode or message the client cannot handle.
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// Rectangle encoded with an id that has no decoder.
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(i32),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of [`RfbError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Socket creation, connect or write failure. The session is unusable.
    Connection,
    /// The stream ended or desynchronised mid-record.
    UnexpectedEof,
    /// Malformed banner, version below minimum or unexpected message.
    Protocol,
    /// No acceptable security type or a failed security result.
    Authentication,
    /// Unsupported depth, colour mode or encoding.
    UnsupportedFeature,
    /// Rejected configuration.
    Config,
}

impl RfbError {
    /// Returns the taxonomy class of this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => ErrorClass::UnexpectedEof,
            Self::Io(_) | Self::Connection(_) | Self::Timeout(_) | Self::NotConnected => {
                ErrorClass::Connection
            }
            Self::UnexpectedEof { .. } | Self::Codec(_) => ErrorClass::UnexpectedEof,
            Self::Protocol(_) | Self::UnsupportedVersion { .. } => ErrorClass::Protocol,
            Self::Authentication(_) => ErrorClass::Authentication,
            Self::UnsupportedFeature(_) | Self::UnsupportedEncoding(_) => {
                ErrorClass::UnsupportedFeature
            }
            Self::Config(_) => ErrorClass::Config,
        }
    }

    /// Returns true if a fresh connection might succeed where this one failed.
    ///
    /// The client never retries on its own; this is a hint for callers that
    /// implement their own reconnect policy.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.class(),
            ErrorClass::Connection | ErrorClass::UnexpectedEof
        ) && !matches!(self, Self::NotConnected)
    }
}
