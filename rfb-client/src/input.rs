//! Keyboard and pointer events sent to the server.

use crate::errors::RfbError;
use crate::keysym;
use crate::protocol;
use bitflags::bitflags;
use rfb_protocol::io::RfbOutStream;
use tokio::io::AsyncWrite;

bitflags! {
    /// RFB pointer button mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ButtonMask: u8 {
        /// Button 1.
        const LEFT = 1 << 0;
        /// Button 2.
        const MIDDLE = 1 << 1;
        /// Button 3.
        const RIGHT = 1 << 2;
        /// Button 4, scroll up.
        const WHEEL_UP = 1 << 3;
        /// Button 5, scroll down.
        const WHEEL_DOWN = 1 << 4;
    }
}

/// Send one KeyEvent.
pub async fn send_key<W: AsyncWrite + Unpin>(
    outstream: &mut RfbOutStream<W>,
    down: bool,
    keysym: u32,
) -> Result<(), RfbError> {
    protocol::write_key_event(outstream, keysym, down).await
}

/// Send one PointerEvent.
pub async fn send_pointer<W: AsyncWrite + Unpin>(
    outstream: &mut RfbOutStream<W>,
    buttons: ButtonMask,
    x: u16,
    y: u16,
) -> Result<(), RfbError> {
    protocol::write_pointer_event(outstream, buttons.bits(), x, y).await
}

/// Keysyms for each character of `text`.
///
/// # Errors
///
/// Returns [`RfbError::UnsupportedFeature`] for the first character that is
/// not printable ASCII. Use named keysyms for Return, Tab and the like.
pub fn keysyms_for_str(text: &str) -> Result<Vec<u32>, RfbError> {
    text.chars()
        .map(|c| {
            keysym::for_char(c).ok_or_else(|| {
                RfbError::UnsupportedFeature(format!(
                    "cannot type non-printable or non-ASCII character {:?} (U+{:04X})",
                    c, c as u32
                ))
            })
        })
        .collect()
}

/// Press and release a key for each character of `text`.
///
/// The whole string is checked before the first event is sent.
pub async fn type_string<W: AsyncWrite + Unpin>(
    outstream: &mut RfbOutStream<W>,
    text: &str,
) -> Result<(), RfbError> {
    for sym in keysyms_for_str(text)? {
        send_key(outstream, true, sym).await?;
        send_key(outstream, false, sym).await?;
    }
    Ok(())
}
