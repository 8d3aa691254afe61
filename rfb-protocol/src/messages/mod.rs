//! RFB protocol message types.
//!
//! This module provides the fixed-layout records exchanged between client and
//! server. Messages are categorized into:
//!
//! - **Core types** ([`types`]) - PixelFormat, Rectangle, encoding and security constants
//! - **Server messages** ([`server`]) - Records read from the server
//! - **Client messages** ([`client`]) - Records written to the server
//!
//! # Wire Format Rules
//!
//! 1. **Big-endian byte order** - All multi-byte integers use network byte order
//! 2. **Padding** - Written as zero, skipped on read
//! 3. **Fail-fast errors** - A short record is a framing error, never a partial value
//!
//! Encoding-specific rectangle payloads are not part of these records; they
//! are consumed by the decoders in `rfb-encodings`.

pub mod client;
pub mod server;
pub mod types;

mod proptest_framing;

// Re-export commonly used types
pub use types::{
    PixelFormat, Rectangle, ENCODING_COPYRECT, ENCODING_HEXTILE, ENCODING_RAW, ENCODING_RRE,
    ENCODING_ZRLE, PSEUDO_ENCODING_CURSOR, PSEUDO_ENCODING_DESKTOP_SIZE,
};

pub use server::{
    FramebufferUpdateHeader, ServerCutTextHeader, ServerInit, ServerInitHeader,
    ServerMessageType,
};

pub use client::{
    ClientInit, FramebufferUpdateRequest, KeyEvent, PointerEvent, SetEncodings, SetPixelFormat,
};
