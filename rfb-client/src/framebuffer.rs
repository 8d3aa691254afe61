//! Framebuffer state management and decoder registry.
//!
//! This module owns the client's framebuffer and dispatches each rectangle of
//! a FramebufferUpdate to the decoder registered for its encoding.

use crate::errors::RfbError;
use crate::protocol_trace;
use rfb_encodings as enc;
use rfb_encodings::{Decoder, RfbInStream};
use rfb_pixelbuffer::ManagedPixelBuffer;
use rfb_protocol::messages::{FramebufferUpdateHeader, Rectangle};
use std::collections::HashMap;
use tokio::io::AsyncRead;

/// Registry of decoders keyed by encoding type.
#[derive(Default)]
pub(crate) struct DecoderRegistry {
    decoders: HashMap<i32, DecoderEntry>,
}

impl DecoderRegistry {
    /// Create a registry with every supported encoding registered.
    pub(crate) fn with_standard() -> Self {
        let mut reg = Self::default();
        reg.register(DecoderEntry::Raw(enc::RawDecoder));
        reg.register(DecoderEntry::DesktopSize(enc::DesktopSizeDecoder));
        reg
    }

    fn register(&mut self, decoder: DecoderEntry) {
        self.decoders.insert(decoder.encoding_type(), decoder);
    }

    fn get(&self, encoding: i32) -> Option<&DecoderEntry> {
        self.decoders.get(&encoding)
    }
}

/// A concrete decoder entry wrapper for dynamic dispatch over non-object-safe Decoder.
enum DecoderEntry {
    Raw(enc::RawDecoder),
    DesktopSize(enc::DesktopSizeDecoder),
}

impl DecoderEntry {
    fn encoding_type(&self) -> i32 {
        match self {
            Self::Raw(d) => d.encoding_type(),
            Self::DesktopSize(d) => d.encoding_type(),
        }
    }

    async fn decode<R: AsyncRead + Unpin>(
        &self,
        stream: &mut RfbInStream<R>,
        rect: &Rectangle,
        buffer: &mut ManagedPixelBuffer,
    ) -> Result<(), RfbError> {
        match self {
            Self::Raw(d) => d.decode(stream, rect, buffer).await,
            Self::DesktopSize(d) => d.decode(stream, rect, buffer).await,
        }
    }
}

/// Framebuffer state and decoder dispatcher.
pub(crate) struct Framebuffer {
    buffer: ManagedPixelBuffer,
    registry: DecoderRegistry,
}

impl Framebuffer {
    /// Create a zero-filled framebuffer of the given size.
    pub(crate) fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: ManagedPixelBuffer::new(u32::from(width), u32::from(height)),
            registry: DecoderRegistry::with_standard(),
        }
    }

    /// Returns the current dimensions.
    pub(crate) fn size(&self) -> (u16, u16) {
        let (w, h) = self.buffer.dimensions();
        (w as u16, h as u16)
    }

    /// Returns a reference to the underlying buffer.
    pub(crate) fn buffer(&self) -> &ManagedPixelBuffer {
        &self.buffer
    }

    /// Apply a single rectangle update from the server.
    pub(crate) async fn apply_rectangle<R: AsyncRead + Unpin>(
        &mut self,
        stream: &mut RfbInStream<R>,
        rect: &Rectangle,
    ) -> Result<(), RfbError> {
        let decoder = self.registry.get(rect.encoding).ok_or_else(|| {
            if let Some(known) = enc::lookup(rect.encoding) {
                tracing::warn!("Server sent {} rectangle, which is not supported", known.name);
            }
            RfbError::UnsupportedEncoding(rect.encoding)
        })?;
        decoder.decode(stream, rect, &mut self.buffer).await
    }

    /// Apply an update by streaming from the input (reads header + decodes rectangles).
    ///
    /// The message type byte must already have been consumed. Rectangles
    /// decoded before a failing one stay applied.
    pub(crate) async fn apply_update_stream<R: AsyncRead + Unpin>(
        &mut self,
        stream: &mut RfbInStream<R>,
    ) -> Result<usize, RfbError> {
        let header: FramebufferUpdateHeader = stream.read_record().await?;
        protocol_trace::in_msg("FramebufferUpdate", || {
            format!("rects={}", header.rectangles)
        });

        for _ in 0..header.rectangles {
            let rect: Rectangle = stream.read_record().await?;
            tracing::debug!(
                "FramebufferUpdate rect: x={}, y={}, w={}, h={}, encoding={}",
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                rect.encoding
            );
            self.apply_rectangle(stream, &rect).await?;
        }
        Ok(header.rectangles as usize)
    }
}
