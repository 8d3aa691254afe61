//! RFB framebuffer storage and pixel utilities.
//!
//! This crate provides the client-side copy of the remote framebuffer and the
//! small image primitive decoders blend into it:
//!
//! - [`ManagedPixelBuffer`] - Owned, tightly packed 4-byte-per-pixel store
//! - [`Image`] - A decoded rectangle waiting to be blended
//! - [`convert`] - Export of the store as an `image::RgbaImage`
//!
//! Pixels are kept exactly as the server sent them in the negotiated
//! [`PixelFormat`]; interpretation happens only on export.

pub mod convert;
pub mod image;
pub mod managed;

pub use self::image::Image;
pub use managed::{ManagedPixelBuffer, BYTES_PER_PIXEL};
pub use rfb_protocol::messages::PixelFormat;
