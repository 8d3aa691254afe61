//! Protocol message helpers for sending/receiving RFB messages.
//!
//! The writers are thin wrappers over the `rfb_protocol::messages` records
//! that add tracing and flush immediately. [`pump_server_messages`] is the
//! receive side of a capture: it drains everything the server has queued and
//! returns once the socket has been quiet for [`POLL_INTERVAL`].

use crate::errors::RfbError;
use crate::framebuffer::Framebuffer;
use crate::protocol_trace;
use rfb_protocol::io::{RfbInStream, RfbOutStream};
use rfb_protocol::messages as msg;
use rfb_protocol::messages::{ServerCutTextHeader, ServerMessageType};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};

/// How long the pump waits for another message before returning.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub(crate) async fn write_set_pixel_format<W: AsyncWrite + Unpin>(
    outstream: &mut RfbOutStream<W>,
    pixel_format: msg::PixelFormat,
) -> Result<(), RfbError> {
    let msg = msg::SetPixelFormat { pixel_format };
    protocol_trace::out_msg("SetPixelFormat", || {
        format!(
            "bpp={} depth={} be={} shifts={}/{}/{}",
            pixel_format.bits_per_pixel,
            pixel_format.depth,
            pixel_format.big_endian,
            pixel_format.red_shift,
            pixel_format.green_shift,
            pixel_format.blue_shift
        )
    });
    outstream.send(&msg).await?;
    tracing::debug!(
        "Wrote SetPixelFormat (bpp={}, depth={}, big_endian={}, shifts r/g/b={}/{}/{})",
        pixel_format.bits_per_pixel,
        pixel_format.depth,
        pixel_format.big_endian,
        pixel_format.red_shift,
        pixel_format.green_shift,
        pixel_format.blue_shift
    );
    Ok(())
}

pub(crate) async fn write_set_encodings<W: AsyncWrite + Unpin>(
    outstream: &mut RfbOutStream<W>,
    encodings: Vec<i32>,
) -> Result<(), RfbError> {
    let msg = msg::SetEncodings { encodings };
    protocol_trace::out_msg("SetEncodings", || format!("{:?}", msg.encodings));
    outstream.send(&msg).await?;
    tracing::debug!("Wrote SetEncodings: {:?}", msg.encodings);
    Ok(())
}

pub(crate) async fn write_framebuffer_update_request<W: AsyncWrite + Unpin>(
    outstream: &mut RfbOutStream<W>,
    incremental: bool,
    width: u16,
    height: u16,
) -> Result<(), RfbError> {
    let msg = msg::FramebufferUpdateRequest::full(incremental, width, height);
    protocol_trace::out_msg("FramebufferUpdateRequest", || {
        format!("inc={} rect=(0,0 {}x{})", incremental, width, height)
    });
    outstream.send(&msg).await?;
    tracing::debug!(
        "Wrote FramebufferUpdateRequest inc={} rect=(0,0 {}x{})",
        incremental,
        width,
        height
    );
    Ok(())
}

pub(crate) async fn write_key_event<W: AsyncWrite + Unpin>(
    outstream: &mut RfbOutStream<W>,
    key: u32,
    down: bool,
) -> Result<(), RfbError> {
    let msg = msg::KeyEvent { down, key };
    protocol_trace::out_msg("KeyEvent", || format!("down={} key=0x{:X}", down, key));
    outstream.send(&msg).await?;
    tracing::debug!("Wrote KeyEvent down={} key=0x{:X}", down, key);
    Ok(())
}

pub(crate) async fn write_pointer_event<W: AsyncWrite + Unpin>(
    outstream: &mut RfbOutStream<W>,
    button_mask: u8,
    x: u16,
    y: u16,
) -> Result<(), RfbError> {
    let msg = msg::PointerEvent { button_mask, x, y };
    protocol_trace::out_msg("PointerEvent", || {
        format!("buttons=0x{:02X} pos=({}, {})", button_mask, x, y)
    });
    outstream.send(&msg).await?;
    tracing::debug!("Wrote PointerEvent buttons=0x{:02X} pos=({}, {})", button_mask, x, y);
    Ok(())
}

/// Process server messages until none arrives within [`POLL_INTERVAL`].
///
/// Returns the number of messages handled. Any error leaves the stream at an
/// unknown position and must end the capture.
pub(crate) async fn pump_server_messages<R: AsyncRead + Unpin>(
    instream: &mut RfbInStream<R>,
    framebuffer: &mut Framebuffer,
) -> Result<usize, RfbError> {
    let mut handled = 0;
    loop {
        let readable = instream.poll_readable(POLL_INTERVAL).await?;
        tracing::trace!("poll_readable -> {}", readable);
        if !readable {
            return Ok(handled);
        }

        let message_type: u8 = instream.read_record().await?;
        match ServerMessageType::from_u8(message_type) {
            Some(ServerMessageType::FramebufferUpdate) => {
                let rects = framebuffer.apply_update_stream(instream).await?;
                tracing::debug!("Applied FramebufferUpdate with {} rectangles", rects);
            }
            Some(ServerMessageType::SetColorMapEntries) => {
                protocol_trace::in_msg("SetColorMapEntries", String::new);
                return Err(RfbError::UnsupportedFeature(
                    "SetColourMapEntries received but colour-map mode was never negotiated"
                        .to_string(),
                ));
            }
            Some(ServerMessageType::Bell) => {
                protocol_trace::in_msg("Bell", String::new);
                tracing::debug!("Bell");
            }
            Some(ServerMessageType::ServerCutText) => {
                let header: ServerCutTextHeader = instream.read_record().await?;
                let length = header.length as usize;
                if protocol_trace::enabled() {
                    let text = instream.read_exact(length).await?;
                    protocol_trace::in_msg("ServerCutText", || format!("len={}", header.length));
                    protocol_trace::hexdump("  cut:", &text, 64);
                } else {
                    instream.skip(length).await?;
                }
                tracing::debug!("Discarded {} bytes of server cut text", header.length);
            }
            None => {
                return Err(RfbError::Protocol(format!(
                    "unsupported message type {}",
                    message_type
                )))
            }
        }
        handled += 1;
    }
}
