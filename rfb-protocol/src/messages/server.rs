//! Server-to-client RFB messages.
//!
//! The type byte is read first by the update pump; the records here describe
//! what follows it.

use super::types::PixelFormat;
use crate::codec::{self, CodecError, WireDecode, WireEncode};
use bytes::{Buf, BufMut};

/// Server-to-client message type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMessageType {
    FramebufferUpdate,
    SetColorMapEntries,
    Bell,
    ServerCutText,
}

impl ServerMessageType {
    /// Map a type byte to a known message, `None` for anything else.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::FramebufferUpdate),
            1 => Some(Self::SetColorMapEntries),
            2 => Some(Self::Bell),
            3 => Some(Self::ServerCutText),
            _ => None,
        }
    }

    /// Wire value of this message type.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::FramebufferUpdate => 0,
            Self::SetColorMapEntries => 1,
            Self::Bell => 2,
            Self::ServerCutText => 3,
        }
    }
}

/// Fixed 24-byte prefix of the ServerInit message.
///
/// # Wire Format
///
/// - 2 bytes: framebuffer width
/// - 2 bytes: framebuffer height
/// - 16 bytes: PixelFormat
/// - 4 bytes: name length
///
/// `name_length` bytes of desktop name follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerInitHeader {
    pub framebuffer_width: u16,
    pub framebuffer_height: u16,
    pub pixel_format: PixelFormat,
    pub name_length: u32,
}

impl WireDecode for ServerInitHeader {
    const SIZE: usize = 24;

    fn decode<B: Buf>(buf: &mut B) -> Result<Self, CodecError> {
        Ok(Self {
            framebuffer_width: codec::get_u16(buf)?,
            framebuffer_height: codec::get_u16(buf)?,
            pixel_format: PixelFormat::decode(buf)?,
            name_length: codec::get_u32(buf)?,
        })
    }
}

impl WireEncode for ServerInitHeader {
    fn encoded_len(&self) -> usize {
        Self::SIZE
    }

    fn encode<B: BufMut>(&self, buf: &mut B) {
        codec::put_u16(buf, self.framebuffer_width);
        codec::put_u16(buf, self.framebuffer_height);
        self.pixel_format.encode(buf);
        codec::put_u32(buf, self.name_length);
    }
}

/// ServerInit message - initial server parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInit {
    pub framebuffer_width: u16,
    pub framebuffer_height: u16,
    pub pixel_format: PixelFormat,
    pub name: String,
}

/// Header of a FramebufferUpdate, after the type byte.
///
/// # Wire Format
///
/// - 1 byte: padding
/// - 2 bytes: number of rectangles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferUpdateHeader {
    pub rectangles: u16,
}

impl WireDecode for FramebufferUpdateHeader {
    const SIZE: usize = 3;

    fn decode<B: Buf>(buf: &mut B) -> Result<Self, CodecError> {
        codec::skip(buf, 1)?;
        Ok(Self {
            rectangles: codec::get_u16(buf)?,
        })
    }
}

impl WireEncode for FramebufferUpdateHeader {
    fn encoded_len(&self) -> usize {
        Self::SIZE
    }

    fn encode<B: BufMut>(&self, buf: &mut B) {
        codec::put_padding(buf, 1);
        codec::put_u16(buf, self.rectangles);
    }
}

/// Header of a ServerCutText message, after the type byte.
///
/// # Wire Format
///
/// - 3 bytes: padding
/// - 4 bytes: text length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerCutTextHeader {
    pub length: u32,
}

impl WireDecode for ServerCutTextHeader {
    const SIZE: usize = 7;

    fn decode<B: Buf>(buf: &mut B) -> Result<Self, CodecError> {
        codec::skip(buf, 3)?;
        Ok(Self {
            length: codec::get_u32(buf)?,
        })
    }
}

impl WireEncode for ServerCutTextHeader {
    fn encoded_len(&self) -> usize {
        Self::SIZE
    }

    fn encode<B: BufMut>(&self, buf: &mut B) {
        codec::put_padding(buf, 3);
        codec::put_u32(buf, self.length);
    }
}
