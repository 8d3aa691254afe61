//! DesktopSize pseudo-encoding.
//!
//! The rectangle carries no payload. Its width and height are the new
//! framebuffer dimensions; the store is reallocated and its contents dropped.

use crate::{Decoder, Rectangle, RfbInStream, PSEUDO_ENCODING_DESKTOP_SIZE};
use rfb_pixelbuffer::ManagedPixelBuffer;
use rfb_protocol::RfbError;
use tokio::io::AsyncRead;

/// Handles server-initiated desktop resizes.
pub struct DesktopSizeDecoder;

impl Decoder for DesktopSizeDecoder {
    fn encoding_type(&self) -> i32 {
        PSEUDO_ENCODING_DESKTOP_SIZE
    }

    async fn decode<R: AsyncRead + Unpin>(
        &self,
        _stream: &mut RfbInStream<R>,
        rect: &Rectangle,
        buffer: &mut ManagedPixelBuffer,
    ) -> Result<(), RfbError> {
        tracing::info!(
            "Desktop resized from {}x{} to {}x{}",
            buffer.width(),
            buffer.height(),
            rect.width,
            rect.height
        );
        buffer.reallocate(u32::from(rect.width), u32::from(rect.height));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfb_pixelbuffer::Image;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_resize_discards_contents() {
        let mut buffer = ManagedPixelBuffer::new(4, 4);
        buffer.blend(&Image::from_raw(1, 1, vec![9; 4]).unwrap(), 0, 0);

        let rect = Rectangle {
            x: 0,
            y: 0,
            width: 800,
            height: 600,
            encoding: PSEUDO_ENCODING_DESKTOP_SIZE,
        };
        let mut stream = RfbInStream::new(Cursor::new(vec![0x42]));
        DesktopSizeDecoder
            .decode(&mut stream, &rect, &mut buffer)
            .await
            .unwrap();

        assert_eq!(buffer.dimensions(), (800, 600));
        assert_eq!(buffer.pixel(0, 0), Some([0; 4]));
        // No payload is consumed.
        assert_eq!(stream.read_record::<u8>().await.unwrap(), 0x42);
    }
}
