//! Raw encoding decoder - uncompressed pixel data.
//!
//! Raw encoding (type 0) is the simplest VNC encoding. It transmits pixels as
//! uncompressed data in the negotiated pixel format. The decoder reads
//! `width * height * 4` bytes from the stream and blends them, fully opaque,
//! into the framebuffer at the rectangle's position.
//!
//! # Wire Format
//!
//! ```text
//! +-------------+
//! | Pixel data  |  width * height * 4 bytes
//! +-------------+
//! ```
//!
//! # Example
//!
//! ```
//! use rfb_encodings::{Decoder, RawDecoder, ENCODING_RAW};
//!
//! let decoder = RawDecoder;
//! assert_eq!(decoder.encoding_type(), ENCODING_RAW);
//! ```

use crate::{Decoder, Rectangle, RfbInStream, ENCODING_RAW};
use rfb_pixelbuffer::{Image, ManagedPixelBuffer, BYTES_PER_PIXEL};
use rfb_protocol::RfbError;
use tokio::io::AsyncRead;

/// Decoder for raw (uncompressed) pixel data.
pub struct RawDecoder;

impl Decoder for RawDecoder {
    fn encoding_type(&self) -> i32 {
        ENCODING_RAW
    }

    async fn decode<R: AsyncRead + Unpin>(
        &self,
        stream: &mut RfbInStream<R>,
        rect: &Rectangle,
        buffer: &mut ManagedPixelBuffer,
    ) -> Result<(), RfbError> {
        let width = u32::from(rect.width);
        let height = u32::from(rect.height);
        let total_bytes = width as usize * height as usize * BYTES_PER_PIXEL;

        let buffer_before = stream.available();
        let pixel_data = stream.read_exact(total_bytes).await?;
        tracing::debug!(
            target: "rfb_encodings::framing",
            "Raw rect [{},{} {}x{}]: {} bytes, {} were buffered",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            total_bytes,
            buffer_before
        );

        let image = Image::from_raw(width, height, pixel_data.to_vec())
            .map_err(|e| RfbError::Protocol(format!("{:#}", e)))?;
        buffer.blend(&image, u32::from(rect.x), u32::from(rect.y));

        Ok(())
    }
}
