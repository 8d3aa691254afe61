//! Core decoding interfaces for RFB (VNC) encodings.
//!
//! This crate defines the [`Decoder`] trait every rectangle decoder implements
//! and the static [`registry`] of encodings the client knows about. A decoder
//! reads a single framebuffer update rectangle from the network stream and
//! applies it to the [`ManagedPixelBuffer`].
//!
//! # Key Concepts
//!
//! - **Async decoding**: Decoders read from a tokio [`AsyncRead`]-backed [`RfbInStream`]
//! - **Rectangle-based**: Decoders operate on a single rectangle at a time
//! - **Fail-fast policy**: A short payload aborts the update; nothing is guessed
//! - **Registry**: Only descriptors flagged as supported are ever advertised
//!
//! # Encoding Types
//!
//! - [`ENCODING_RAW`] (0): Uncompressed pixel data, decoded by [`RawDecoder`]
//! - [`PSEUDO_ENCODING_DESKTOP_SIZE`] (-223): Desktop resolution change, handled by
//!   [`DesktopSizeDecoder`]
//!
//! CopyRect, RRE, Hextile, ZRLE and Cursor are listed in the registry but not
//! supported; a rectangle arriving in any of them is an error.

use rfb_pixelbuffer::ManagedPixelBuffer;
use rfb_protocol::RfbError;
use tokio::io::AsyncRead;

// Re-export types from rfb-protocol used by decoders
pub use rfb_protocol::io::RfbInStream;
pub use rfb_protocol::messages::types::{
    Rectangle, ENCODING_COPYRECT, ENCODING_HEXTILE, ENCODING_RAW, ENCODING_RRE, ENCODING_ZRLE,
    PSEUDO_ENCODING_CURSOR, PSEUDO_ENCODING_DESKTOP_SIZE,
};

pub mod desktop_size;
pub mod raw;
pub mod registry;

pub use desktop_size::DesktopSizeDecoder;
pub use raw::RawDecoder;
pub use registry::{advertised_encodings, lookup, EncodingDescriptor, REGISTRY};

/// Core trait for rectangle decoders.
///
/// # Contract
///
/// Implementors must:
/// - Read exactly the bytes for the rectangle as defined by their encoding
/// - Leave the buffer untouched if the payload cannot be read in full
/// - Fail fast with clear error messages (no defensive fallbacks)
///
/// # Example
///
/// ```no_run
/// use rfb_encodings::{Decoder, RfbInStream, Rectangle, ENCODING_RAW};
/// use rfb_pixelbuffer::ManagedPixelBuffer;
/// use rfb_protocol::RfbError;
/// use tokio::io::AsyncRead;
///
/// struct SkipDecoder;
///
/// impl Decoder for SkipDecoder {
///     fn encoding_type(&self) -> i32 {
///         ENCODING_RAW
///     }
///
///     async fn decode<R: AsyncRead + Unpin>(
///         &self,
///         stream: &mut RfbInStream<R>,
///         rect: &Rectangle,
///         _buffer: &mut ManagedPixelBuffer,
///     ) -> Result<(), RfbError> {
///         stream.skip(rect.width as usize * rect.height as usize * 4).await
///     }
/// }
/// ```
#[allow(async_fn_in_trait)]
pub trait Decoder {
    /// Returns the RFB encoding id this decoder handles.
    fn encoding_type(&self) -> i32;

    /// Decode a single rectangle from the input stream into the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`RfbError::UnexpectedEof`] if the stream ends inside the
    /// payload, or whatever the encoding considers malformed.
    async fn decode<R: AsyncRead + Unpin>(
        &self,
        stream: &mut RfbInStream<R>,
        rect: &Rectangle,
        buffer: &mut ManagedPixelBuffer,
    ) -> Result<(), RfbError>;
}
