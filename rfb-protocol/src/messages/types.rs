//! Core RFB protocol types.
//!
//! This module defines fundamental types used throughout the RFB protocol:
//! - [`PixelFormat`] - Describes pixel format (bit depths, color channels, endianness)
//! - [`Rectangle`] - Rectangle header with encoding type
//! - Encoding and security type constants

use crate::codec::{self, CodecError, WireDecode, WireEncode};
use bytes::{Buf, BufMut};

/// RFB pixel format specification.
///
/// # Wire Format
///
/// PixelFormat is 16 bytes on the wire:
/// - 1 byte: bits_per_pixel
/// - 1 byte: depth
/// - 1 byte: big_endian flag
/// - 1 byte: true_color flag
/// - 2 bytes: red_max
/// - 2 bytes: green_max
/// - 2 bytes: blue_max
/// - 1 byte: red_shift
/// - 1 byte: green_shift
/// - 1 byte: blue_shift
/// - 3 bytes: padding
///
/// # Examples
///
/// ```
/// use rfb_protocol::messages::types::PixelFormat;
///
/// let pf = PixelFormat::rgb888();
/// assert_eq!(pf.bytes_per_pixel(), 4);
/// assert_eq!(pf.depth, 24);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    pub bits_per_pixel: u8,
    pub depth: u8,
    pub big_endian: bool,
    pub true_color: bool,
    pub red_max: u16,
    pub green_max: u16,
    pub blue_max: u16,
    pub red_shift: u8,
    pub green_shift: u8,
    pub blue_shift: u8,
}

impl PixelFormat {
    /// 32 bits per pixel, depth 24, little-endian, `0x00RRGGBB`.
    pub const fn rgb888() -> Self {
        Self {
            bits_per_pixel: 32,
            depth: 24,
            big_endian: false,
            true_color: true,
            red_max: 255,
            green_max: 255,
            blue_max: 255,
            red_shift: 16,
            green_shift: 8,
            blue_shift: 0,
        }
    }

    /// Calculate bytes per pixel (1, 2, 3, or 4).
    pub fn bytes_per_pixel(&self) -> u8 {
        self.bits_per_pixel.div_ceil(8)
    }
}

impl WireEncode for PixelFormat {
    fn encoded_len(&self) -> usize {
        Self::SIZE
    }

    fn encode<B: BufMut>(&self, buf: &mut B) {
        codec::put_u8(buf, self.bits_per_pixel);
        codec::put_u8(buf, self.depth);
        codec::put_flag(buf, self.big_endian);
        codec::put_flag(buf, self.true_color);
        codec::put_u16(buf, self.red_max);
        codec::put_u16(buf, self.green_max);
        codec::put_u16(buf, self.blue_max);
        codec::put_u8(buf, self.red_shift);
        codec::put_u8(buf, self.green_shift);
        codec::put_u8(buf, self.blue_shift);
        codec::put_padding(buf, 3);
    }
}

impl WireDecode for PixelFormat {
    const SIZE: usize = 16;

    fn decode<B: Buf>(buf: &mut B) -> Result<Self, CodecError> {
        let pf = Self {
            bits_per_pixel: codec::get_u8(buf)?,
            depth: codec::get_u8(buf)?,
            big_endian: codec::get_flag(buf)?,
            true_color: codec::get_flag(buf)?,
            red_max: codec::get_u16(buf)?,
            green_max: codec::get_u16(buf)?,
            blue_max: codec::get_u16(buf)?,
            red_shift: codec::get_u8(buf)?,
            green_shift: codec::get_u8(buf)?,
            blue_shift: codec::get_u8(buf)?,
        };
        codec::skip(buf, 3)?;
        Ok(pf)
    }
}

/// Rectangle header for framebuffer updates.
///
/// # Wire Format
///
/// Rectangle header is 12 bytes:
/// - 2 bytes: x position
/// - 2 bytes: y position
/// - 2 bytes: width
/// - 2 bytes: height
/// - 4 bytes: encoding type (signed i32)
///
/// The encoding-specific payload that follows is consumed by the decoder
/// registered for [`encoding`](Self::encoding).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub encoding: i32,
}

impl WireEncode for Rectangle {
    fn encoded_len(&self) -> usize {
        Self::SIZE
    }

    fn encode<B: BufMut>(&self, buf: &mut B) {
        codec::put_u16(buf, self.x);
        codec::put_u16(buf, self.y);
        codec::put_u16(buf, self.width);
        codec::put_u16(buf, self.height);
        codec::put_encoding(buf, self.encoding);
    }
}

impl WireDecode for Rectangle {
    const SIZE: usize = 12;

    fn decode<B: Buf>(buf: &mut B) -> Result<Self, CodecError> {
        Ok(Self {
            x: codec::get_u16(buf)?,
            y: codec::get_u16(buf)?,
            width: codec::get_u16(buf)?,
            height: codec::get_u16(buf)?,
            encoding: codec::get_i32(buf)?,
        })
    }
}

//
// Encoding type constants
//

/// Raw encoding - uncompressed pixel data.
pub const ENCODING_RAW: i32 = 0;

/// CopyRect encoding - copy from another screen region.
pub const ENCODING_COPYRECT: i32 = 1;

/// RRE (Rise-and-Run-length Encoding).
pub const ENCODING_RRE: i32 = 2;

/// Hextile encoding - 16x16 tile-based compression.
pub const ENCODING_HEXTILE: i32 = 5;

/// ZRLE (Zlib Run-Length Encoding).
pub const ENCODING_ZRLE: i32 = 16;

//
// Pseudo-encodings
//

/// DesktopSize pseudo-encoding: the rectangle's width/height are the new
/// framebuffer dimensions; no payload follows.
pub const PSEUDO_ENCODING_DESKTOP_SIZE: i32 = -223; // 0xFFFFFF21

/// Cursor pseudo-encoding (client-side cursor shape).
pub const PSEUDO_ENCODING_CURSOR: i32 = -239; // 0xFFFFFF11

//
// Security type constants
//

/// No security - no authentication required.
pub const SECURITY_TYPE_NONE: u8 = 1;

/// VNC authentication - challenge-response with password.
pub const SECURITY_TYPE_VNC_AUTH: u8 = 2;

/// Vendor-specific username/password authentication.
pub const SECURITY_TYPE_VENDOR_AUTH: u8 = 30;
