//! Client-to-server RFB messages.
//!
//! Every message encodes its leading type byte, so the encoded bytes are the
//! exact wire image.

use super::types::PixelFormat;
use crate::codec::{self, WireEncode};
use bytes::BufMut;

/// Message type ids (client to server).
pub const MSG_SET_PIXEL_FORMAT: u8 = 0;
pub const MSG_SET_ENCODINGS: u8 = 2;
pub const MSG_FRAMEBUFFER_UPDATE_REQUEST: u8 = 3;
pub const MSG_KEY_EVENT: u8 = 4;
pub const MSG_POINTER_EVENT: u8 = 5;

/// ClientInit message - client initialization.
///
/// # Wire Format
///
/// - 1 byte: shared flag (0 = exclusive, 1 = shared)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientInit {
    pub shared: bool,
}

impl WireEncode for ClientInit {
    fn encoded_len(&self) -> usize {
        1
    }

    fn encode<B: BufMut>(&self, buf: &mut B) {
        codec::put_flag(buf, self.shared);
    }
}

/// SetPixelFormat message - change pixel format.
///
/// # Wire Format
///
/// - 1 byte: message type (0)
/// - 3 bytes: padding
/// - 16 bytes: PixelFormat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetPixelFormat {
    pub pixel_format: PixelFormat,
}

impl WireEncode for SetPixelFormat {
    fn encoded_len(&self) -> usize {
        20
    }

    fn encode<B: BufMut>(&self, buf: &mut B) {
        codec::put_u8(buf, MSG_SET_PIXEL_FORMAT);
        codec::put_padding(buf, 3);
        self.pixel_format.encode(buf);
    }
}

/// SetEncodings message - declare supported encodings.
///
/// # Wire Format
///
/// - 1 byte: message type (2)
/// - 1 byte: padding
/// - 2 bytes: number of encodings
/// - N * 4 bytes: encoding types (signed i32 each)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetEncodings {
    pub encodings: Vec<i32>,
}

impl WireEncode for SetEncodings {
    fn encoded_len(&self) -> usize {
        4 + 4 * self.encodings.len()
    }

    fn encode<B: BufMut>(&self, buf: &mut B) {
        codec::put_u8(buf, MSG_SET_ENCODINGS);
        codec::put_padding(buf, 1);
        codec::put_u16(buf, self.encodings.len() as u16);
        for encoding in &self.encodings {
            codec::put_encoding(buf, *encoding);
        }
    }
}

/// FramebufferUpdateRequest message - request screen update.
///
/// # Wire Format
///
/// - 1 byte: message type (3)
/// - 1 byte: incremental (0 = full update, 1 = incremental)
/// - 2 bytes each: x, y, width, height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferUpdateRequest {
    pub incremental: bool,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl FramebufferUpdateRequest {
    /// Request covering the whole `width` x `height` framebuffer.
    pub const fn full(incremental: bool, width: u16, height: u16) -> Self {
        Self {
            incremental,
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

impl WireEncode for FramebufferUpdateRequest {
    fn encoded_len(&self) -> usize {
        10
    }

    fn encode<B: BufMut>(&self, buf: &mut B) {
        codec::put_u8(buf, MSG_FRAMEBUFFER_UPDATE_REQUEST);
        codec::put_flag(buf, self.incremental);
        codec::put_u16(buf, self.x);
        codec::put_u16(buf, self.y);
        codec::put_u16(buf, self.width);
        codec::put_u16(buf, self.height);
    }
}

/// KeyEvent message - keyboard input.
///
/// # Wire Format
///
/// - 1 byte: message type (4)
/// - 1 byte: down flag (0 = up, 1 = down)
/// - 2 bytes: padding
/// - 4 bytes: keysym (X11 keysym value)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub down: bool,
    pub key: u32, // X11 keysym
}

impl WireEncode for KeyEvent {
    fn encoded_len(&self) -> usize {
        8
    }

    fn encode<B: BufMut>(&self, buf: &mut B) {
        codec::put_u8(buf, MSG_KEY_EVENT);
        codec::put_flag(buf, self.down);
        codec::put_padding(buf, 2);
        codec::put_u32(buf, self.key);
    }
}

/// PointerEvent message - mouse input.
///
/// # Wire Format
///
/// - 1 byte: message type (5)
/// - 1 byte: button mask
/// - 2 bytes: x position
/// - 2 bytes: y position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub button_mask: u8,
    pub x: u16,
    pub y: u16,
}

impl WireEncode for PointerEvent {
    fn encoded_len(&self) -> usize {
        6
    }

    fn encode<B: BufMut>(&self, buf: &mut B) {
        codec::put_u8(buf, MSG_POINTER_EVENT);
        codec::put_u8(buf, self.button_mask);
        codec::put_u16(buf, self.x);
        codec::put_u16(buf, self.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_client_init() {
        assert_eq!(&ClientInit { shared: true }.to_bytes()[..], &[1]);
        assert_eq!(&ClientInit { shared: false }.to_bytes()[..], &[0]);
    }

    #[test]
    fn test_set_pixel_format_layout() {
        let msg = SetPixelFormat {
            pixel_format: PixelFormat::rgb888(),
        };
        let bytes = msg.to_bytes();
        assert_eq!(bytes.len(), msg.encoded_len());
        assert_eq!(
            bytes.to_vec(),
            vec![0, 0, 0, 0, 32, 24, 0, 1, 0, 255, 0, 255, 0, 255, 16, 8, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_set_encodings_layout() {
        let msg = SetEncodings {
            encodings: vec![0, -223],
        };
        let bytes = msg.to_bytes();
        assert_eq!(bytes.len(), msg.encoded_len());
        assert_eq!(
            bytes.to_vec(),
            vec![2, 0, 0, 2, 0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0x21]
        );
    }

    #[test]
    fn test_framebuffer_update_request_layout() {
        let msg = FramebufferUpdateRequest::full(true, 1024, 768);
        assert_eq!(
            msg.to_bytes().to_vec(),
            vec![3, 1, 0, 0, 0, 0, 0x04, 0x00, 0x03, 0x00]
        );
    }

    #[test]
    fn test_key_events_differ_only_in_down_flag() {
        let down = KeyEvent {
            down: true,
            key: 0x0041,
        }
        .to_bytes();
        let up = KeyEvent {
            down: false,
            key: 0x0041,
        }
        .to_bytes();

        assert_eq!(down.to_vec(), vec![4, 1, 0, 0, 0, 0, 0, 0x41]);
        assert_eq!(up.to_vec(), vec![4, 0, 0, 0, 0, 0, 0, 0x41]);
        let differing: Vec<usize> = (0..8).filter(|&i| down[i] != up[i]).collect();
        assert_eq!(differing, vec![1]);
    }

    #[test]
    fn test_pointer_event_layout() {
        let msg = PointerEvent {
            button_mask: 0x04,
            x: 300,
            y: 2,
        };
        assert_eq!(msg.to_bytes().to_vec(), vec![5, 4, 0x01, 0x2C, 0, 2]);
    }
}
