//! Pixel-format interpretation for exporting the framebuffer.
//!
//! The store keeps server bytes verbatim. These helpers decode them with the
//! negotiated [`PixelFormat`] so the framebuffer can be saved or compared as
//! ordinary RGBA.
//!
//! # Channel Extraction and Scaling
//!
//! To extract a color component from a pixel value:
//! 1. Assemble the bytes into an integer according to endianness
//! 2. Shift right by the channel's shift value and mask with the channel's max
//! 3. Scale to 8-bit: `(component * 255) / channel_max`

use crate::{ManagedPixelBuffer, PixelFormat, BYTES_PER_PIXEL};
use anyhow::{anyhow, Result};
use ::image::RgbaImage;

/// Converts one stored pixel to `[R, G, B, 255]`.
///
/// A channel whose max is zero decodes as 0.
///
/// ```
/// use rfb_pixelbuffer::{convert, PixelFormat};
///
/// // Pixel value 0x00112233 stored little-endian
/// let rgba = convert::to_rgba(&PixelFormat::rgb888(), [0x33, 0x22, 0x11, 0x00]);
/// assert_eq!(rgba, [0x11, 0x22, 0x33, 0xFF]);
/// ```
pub fn to_rgba(format: &PixelFormat, pixel: [u8; 4]) -> [u8; 4] {
    let value = if format.big_endian {
        u32::from_be_bytes(pixel)
    } else {
        u32::from_le_bytes(pixel)
    };

    let channel = |shift: u8, max: u16| -> u8 {
        if max == 0 {
            return 0;
        }
        let component = value.checked_shr(u32::from(shift)).unwrap_or(0) & u32::from(max);
        ((component * 255) / u32::from(max)) as u8
    };

    [
        channel(format.red_shift, format.red_max),
        channel(format.green_shift, format.green_max),
        channel(format.blue_shift, format.blue_max),
        0xFF,
    ]
}

/// Decodes the whole framebuffer into an [`RgbaImage`].
///
/// # Errors
///
/// Fails if `format` is not a 32 bits-per-pixel true-colour format, the only
/// kind the store holds.
pub fn to_rgba_image(buffer: &ManagedPixelBuffer, format: &PixelFormat) -> Result<RgbaImage> {
    if format.bits_per_pixel != 32 || !format.true_color {
        return Err(anyhow!(
            "Cannot export framebuffer in {}bpp {} format",
            format.bits_per_pixel,
            if format.true_color { "true-colour" } else { "colour-map" }
        ));
    }

    let mut rgba = Vec::with_capacity(buffer.data().len());
    for pixel in buffer.data().chunks_exact(BYTES_PER_PIXEL) {
        let pixel = [pixel[0], pixel[1], pixel[2], pixel[3]];
        rgba.extend_from_slice(&to_rgba(format, pixel));
    }

    RgbaImage::from_raw(buffer.width(), buffer.height(), rgba)
        .ok_or_else(|| anyhow!("Framebuffer size does not match its dimensions"))
}
