//! Display initialization after the security handshake.
//!
//! Exchanges ClientInit/ServerInit, settles the pixel format and advertises
//! the encodings this client can decode.

use crate::config::DisplayConfig;
use crate::errors::RfbError;
use crate::protocol;
use rfb_encodings::{advertised_encodings, REGISTRY};
use rfb_protocol::handshake;
use rfb_protocol::io::{RfbInStream, RfbOutStream};
use rfb_protocol::messages::PixelFormat;
use tokio::io::{AsyncRead, AsyncWrite};

/// Pixel layouts the client can interpret, keyed by depth.
pub const SUPPORTED_DEPTHS: &[PixelFormat] = &[PixelFormat::rgb888()];

/// What the server and client agreed on during initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayInfo {
    /// Framebuffer width in pixels.
    pub width: u16,
    /// Framebuffer height in pixels.
    pub height: u16,
    /// Pixel format sent in SetPixelFormat.
    pub pixel_format: PixelFormat,
    /// Desktop name from ServerInit.
    pub name: String,
}

fn table_entry(depth: u8) -> Option<&'static PixelFormat> {
    SUPPORTED_DEPTHS.iter().find(|pf| pf.depth == depth)
}

/// Settle the pixel format from the server's and an optional requested depth.
///
/// Without a requested depth the server's format is adopted as is. A
/// requested depth that differs from the server's takes its channel max and
/// shift values from [`SUPPORTED_DEPTHS`] while the server's bpp and depth
/// stay. Either way the effective depth must be in the table with matching
/// bpp and true-colour flag.
///
/// # Errors
///
/// Returns [`RfbError::UnsupportedFeature`] if the combination cannot be
/// interpreted.
pub fn resolve_pixel_format(
    server: &PixelFormat,
    requested_depth: Option<u8>,
) -> Result<PixelFormat, RfbError> {
    let depth = requested_depth.unwrap_or(server.depth);
    let entry = table_entry(depth)
        .ok_or_else(|| RfbError::UnsupportedFeature(format!("unsupported pixel depth {}", depth)))?;

    if entry.bits_per_pixel != server.bits_per_pixel {
        return Err(RfbError::UnsupportedFeature(format!(
            "depth {} requires {} bits per pixel, server uses {}",
            depth, entry.bits_per_pixel, server.bits_per_pixel
        )));
    }
    if entry.true_color != server.true_color {
        return Err(RfbError::UnsupportedFeature(format!(
            "depth {} requires true colour {}, server uses {}",
            depth, entry.true_color, server.true_color
        )));
    }

    let mut pf = *server;
    if depth != server.depth {
        pf.red_max = entry.red_max;
        pf.green_max = entry.green_max;
        pf.blue_max = entry.blue_max;
        pf.red_shift = entry.red_shift;
        pf.green_shift = entry.green_shift;
        pf.blue_shift = entry.blue_shift;
    }
    Ok(pf)
}

/// Byte order to request: the server's when honoring it, else the host's.
pub fn select_big_endian(server_big_endian: bool, honor_server_endianness: bool) -> bool {
    if honor_server_endianness {
        server_big_endian
    } else {
        cfg!(target_endian = "big")
    }
}

/// Run the display initialization sequence.
///
/// Sends a shared ClientInit, reads ServerInit, then sends SetPixelFormat and
/// SetEncodings. Size overrides in `config` replace the server's dimensions.
pub async fn initialize<R, W>(
    instream: &mut RfbInStream<R>,
    outstream: &mut RfbOutStream<W>,
    config: &DisplayConfig,
) -> Result<DisplayInfo, RfbError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    handshake::send_client_init(outstream, true).await?;
    let server_init = handshake::recv_server_init(instream).await?;
    tracing::debug!(
        "ServerInit: {}x{} depth={} bpp={} name={:?}",
        server_init.framebuffer_width,
        server_init.framebuffer_height,
        server_init.pixel_format.depth,
        server_init.pixel_format.bits_per_pixel,
        server_init.name
    );

    let mut pixel_format = resolve_pixel_format(&server_init.pixel_format, config.depth)?;
    pixel_format.big_endian = select_big_endian(
        server_init.pixel_format.big_endian,
        config.honor_server_endianness,
    );

    let width = config.width.unwrap_or(server_init.framebuffer_width);
    let height = config.height.unwrap_or(server_init.framebuffer_height);

    protocol::write_set_pixel_format(outstream, pixel_format).await?;
    let encodings = advertised_encodings(REGISTRY, config.bandwidth_optimization);
    protocol::write_set_encodings(outstream, encodings).await?;

    Ok(DisplayInfo {
        width,
        height,
        pixel_format,
        name: server_init.name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rfb_protocol::codec::WireEncode;
    use rfb_protocol::messages::ServerInitHeader;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn bgr_server_format() -> PixelFormat {
        PixelFormat {
            red_shift: 0,
            green_shift: 8,
            blue_shift: 16,
            ..PixelFormat::rgb888()
        }
    }

    #[test]
    fn test_no_requested_depth_adopts_server_format() {
        let server = bgr_server_format();
        assert_eq!(resolve_pixel_format(&server, None).unwrap(), server);
    }

    #[test]
    fn test_matching_requested_depth_keeps_server_shifts() {
        let server = bgr_server_format();
        assert_eq!(resolve_pixel_format(&server, Some(24)).unwrap(), server);
    }

    #[test]
    fn test_different_requested_depth_uses_table_channels() {
        let server = PixelFormat {
            depth: 32,
            ..bgr_server_format()
        };
        let pf = resolve_pixel_format(&server, Some(24)).unwrap();
        assert_eq!(pf.depth, 32);
        assert_eq!(pf.bits_per_pixel, 32);
        assert_eq!((pf.red_shift, pf.green_shift, pf.blue_shift), (16, 8, 0));
        assert_eq!((pf.red_max, pf.green_max, pf.blue_max), (255, 255, 255));
    }

    #[test]
    fn test_server_depth_16_rejected() {
        let server = PixelFormat {
            bits_per_pixel: 16,
            depth: 16,
            red_max: 31,
            green_max: 63,
            blue_max: 31,
            red_shift: 11,
            green_shift: 5,
            blue_shift: 0,
            ..PixelFormat::rgb888()
        };
        assert!(matches!(
            resolve_pixel_format(&server, None),
            Err(RfbError::UnsupportedFeature(_))
        ));
    }

    #[test]
    fn test_bpp_and_colour_mode_mismatch_rejected() {
        let server = PixelFormat {
            bits_per_pixel: 16,
            ..PixelFormat::rgb888()
        };
        assert!(resolve_pixel_format(&server, Some(24)).is_err());

        let server = PixelFormat {
            true_color: false,
            ..PixelFormat::rgb888()
        };
        assert!(resolve_pixel_format(&server, None).is_err());
        assert!(resolve_pixel_format(&PixelFormat::rgb888(), Some(8)).is_err());
    }

    #[test]
    fn test_endianness_selection() {
        assert!(select_big_endian(true, true));
        assert!(!select_big_endian(false, true));
        assert_eq!(select_big_endian(true, false), cfg!(target_endian = "big"));
    }

    fn server_init_bytes(pf: PixelFormat, name: &str) -> Vec<u8> {
        let mut data = ServerInitHeader {
            framebuffer_width: 640,
            framebuffer_height: 480,
            pixel_format: pf,
            name_length: name.len() as u32,
        }
        .to_bytes()
        .to_vec();
        data.extend_from_slice(name.as_bytes());
        data
    }

    #[tokio::test]
    async fn test_initialize_sequence() {
        let (client, mut server) = tokio::io::duplex(1024);
        let (read, write) = tokio::io::split(client);
        let mut input = RfbInStream::new(read);
        let mut output = RfbOutStream::new(write);

        let server_pf = PixelFormat {
            big_endian: true,
            ..PixelFormat::rgb888()
        };
        server
            .write_all(&server_init_bytes(server_pf, "desk"))
            .await
            .unwrap();

        let config = DisplayConfig {
            honor_server_endianness: true,
            ..DisplayConfig::default()
        };
        let info = initialize(&mut input, &mut output, &config).await.unwrap();
        assert_eq!((info.width, info.height), (640, 480));
        assert_eq!(info.name, "desk");
        assert_eq!(info.pixel_format, server_pf);

        // ClientInit + SetPixelFormat + SetEncodings [0, -223]
        let mut sent = vec![0u8; 1 + 20 + 12];
        server.read_exact(&mut sent).await.unwrap();
        assert_eq!(sent[0], 1);
        assert_eq!(&sent[1..5], &[0, 0, 0, 0]);
        assert_eq!(&sent[5..9], &[32, 24, 1, 1]);
        assert_eq!(
            &sent[21..],
            &[2, 0, 0, 2, 0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0x21]
        );
    }

    #[tokio::test]
    async fn test_initialize_size_override() {
        let (client, mut server) = tokio::io::duplex(1024);
        let (read, write) = tokio::io::split(client);
        let mut input = RfbInStream::new(read);
        let mut output = RfbOutStream::new(write);

        server
            .write_all(&server_init_bytes(PixelFormat::rgb888(), ""))
            .await
            .unwrap();

        let config = DisplayConfig {
            width: Some(320),
            height: Some(200),
            ..DisplayConfig::default()
        };
        let info = initialize(&mut input, &mut output, &config).await.unwrap();
        assert_eq!((info.width, info.height), (320, 200));
        assert_eq!(info.name, "");
    }
}
