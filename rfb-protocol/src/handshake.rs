//! RFB protocol handshake implementation.
//!
//! This module implements the opening phases of an RFB session:
//!
//! 1. **Protocol Version Negotiation** - Client and server agree on an RFB version
//! 2. **Security Handshake** - Negotiate the security type and read its result
//! 3. **Initialization** - Exchange ClientInit/ServerInit messages
//!
//! # Supported Protocol Versions
//!
//! Any server version from 3.3 upwards is accepted. Versions above 3.8 are
//! answered with 3.8; anything else is echoed back verbatim. Versions are
//! compared in their zero-padded `ddd.ddd` text form, which the fixed-width
//! banner guarantees to order the same way as the numbers.
//!
//! # Security Types
//!
//! Only `None` (type 1) completes. The preference order is `[30, 1, 2]` when a
//! username was supplied and `[1, 2]` otherwise; choosing anything other than
//! `None` fails immediately because no credential exchange is implemented.
//!
//! # Error Handling
//!
//! This module follows the project's **fail-fast** policy:
//! - Invalid protocol versions are rejected immediately
//! - Unsupported security types cause connection failure
//! - No retries, no silent degradation
//!
//! # References
//!
//! - [RFB Protocol Specification](https://github.com/rfbproto/rfbproto/blob/master/rfbproto.rst)

use crate::errors::RfbError;
use crate::io::{RfbInStream, RfbOutStream};
use crate::messages::types::{
    SECURITY_TYPE_NONE, SECURITY_TYPE_VENDOR_AUTH, SECURITY_TYPE_VNC_AUTH,
};
use crate::messages::{ClientInit, ServerInit, ServerInitHeader};
use std::cmp::Ordering;
use std::fmt;
use tokio::io::{AsyncRead, AsyncWrite};

/// Length of the `RFB ddd.ddd\n` banner.
pub const VERSION_BANNER_LEN: usize = 12;

/// An RFB protocol version as announced in the `RFB ddd.ddd\n` banner.
///
/// Ordering compares the zero-padded `ddd.ddd` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtocolVersion {
    pub major: u16,
    pub minor: u16,
}

impl ProtocolVersion {
    pub const V3_3: Self = Self::new(3, 3);
    pub const V3_7: Self = Self::new(3, 7);
    pub const V3_8: Self = Self::new(3, 8);

    /// Highest version this client speaks.
    pub const MAX_SUPPORTED: Self = Self::V3_8;

    /// Lowest version this client accepts.
    pub const MIN_SUPPORTED: Self = Self::V3_3;

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Parse a 12-byte `RFB ddd.ddd\n` banner.
    ///
    /// # Errors
    ///
    /// Returns [`RfbError::Protocol`] if the banner does not match the pattern.
    pub fn parse(banner: &[u8]) -> Result<Self, RfbError> {
        let malformed = || {
            RfbError::Protocol(format!(
                "invalid RFB version string: expected 'RFB ddd.ddd\\n', got {:?}",
                String::from_utf8_lossy(banner)
            ))
        };

        if banner.len() != VERSION_BANNER_LEN
            || &banner[0..4] != b"RFB "
            || banner[7] != b'.'
            || banner[11] != b'\n'
        {
            return Err(malformed());
        }

        let digits = |field: &[u8]| -> Option<u16> {
            field.iter().try_fold(0u16, |acc, b| {
                b.is_ascii_digit().then(|| acc * 10 + u16::from(b - b'0'))
            })
        };

        let major = digits(&banner[4..7]).ok_or_else(malformed)?;
        let minor = digits(&banner[8..11]).ok_or_else(malformed)?;
        Ok(Self { major, minor })
    }

    /// The 12-byte banner for this version.
    pub fn banner(&self) -> String {
        format!("RFB {}\n", self)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}.{:03}", self.major, self.minor)
    }
}

impl Ord for ProtocolVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

impl PartialOrd for ProtocolVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Outcome of version and security negotiation. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedProtocol {
    /// Version sent back to the server and used for every later branch.
    pub version: ProtocolVersion,
    /// Security type the session runs under.
    pub security_type: u8,
}

/// Negotiate RFB protocol version with the server.
///
/// Reads the server banner, rejects versions below 3.3, clamps anything above
/// 3.8 and echoes the result.
pub async fn negotiate_version<R: AsyncRead + Unpin, W: AsyncWrite + Unpin>(
    instream: &mut RfbInStream<R>,
    outstream: &mut RfbOutStream<W>,
) -> Result<ProtocolVersion, RfbError> {
    let banner = instream.read_exact(VERSION_BANNER_LEN).await?;
    let server = ProtocolVersion::parse(&banner)?;
    tracing::debug!("Server announced RFB {}", server);

    if server < ProtocolVersion::MIN_SUPPORTED {
        return Err(RfbError::UnsupportedVersion {
            server: server.to_string(),
        });
    }

    let negotiated = if server > ProtocolVersion::MAX_SUPPORTED {
        tracing::warn!(
            "Server version {} is newer than supported, answering with {}",
            server,
            ProtocolVersion::MAX_SUPPORTED
        );
        ProtocolVersion::MAX_SUPPORTED
    } else {
        server
    };

    outstream.write_bytes(negotiated.banner().as_bytes());
    outstream.flush().await?;

    Ok(negotiated)
}

/// Pick a security type from the server's offer.
///
/// Returns the first entry of the preference list that the server offered.
pub fn select_security_type(offered: &[u8], have_username: bool) -> Option<u8> {
    let preference: &[u8] = if have_username {
        &[SECURITY_TYPE_VENDOR_AUTH, SECURITY_TYPE_NONE, SECURITY_TYPE_VNC_AUTH]
    } else {
        &[SECURITY_TYPE_NONE, SECURITY_TYPE_VNC_AUTH]
    };
    preference.iter().copied().find(|t| offered.contains(t))
}

/// Whether the server sends a SecurityResult for this version and type.
///
/// RFB 3.3 and 3.7 send no result for `None`.
pub fn expects_security_result(version: ProtocolVersion, security_type: u8) -> bool {
    (version >= ProtocolVersion::V3_8 && security_type == SECURITY_TYPE_NONE)
        || security_type == SECURITY_TYPE_VNC_AUTH
}

/// Negotiate security type with the server.
///
/// On success the chosen type has been acknowledged and its result (if any)
/// checked.
pub async fn negotiate_security<R: AsyncRead + Unpin, W: AsyncWrite + Unpin>(
    instream: &mut RfbInStream<R>,
    outstream: &mut RfbOutStream<W>,
    version: ProtocolVersion,
    have_username: bool,
) -> Result<NegotiatedProtocol, RfbError> {
    let security_type = if version >= ProtocolVersion::V3_7 {
        let count: u8 = instream.read_record().await?;
        if count == 0 {
            let reason = read_reason(instream).await?;
            return Err(RfbError::Authentication(format!(
                "no security types offered: {}",
                reason
            )));
        }

        let offered = instream.read_exact(count as usize).await?;
        tracing::debug!("Server offered security types {:?}", &offered[..]);
        select_security_type(&offered, have_username).ok_or_else(|| {
            RfbError::Authentication(format!(
                "no acceptable security type offered (got {:?})",
                &offered[..]
            ))
        })?
    } else {
        let dictated: u32 = instream.read_record().await?;
        if dictated == 0 {
            let reason = read_reason(instream).await?;
            return Err(RfbError::Authentication(format!(
                "server rejected connection: {}",
                reason
            )));
        }
        u8::try_from(dictated).map_err(|_| {
            RfbError::Authentication(format!("unsupported security type {}", dictated))
        })?
    };

    if security_type != SECURITY_TYPE_NONE {
        return Err(RfbError::Authentication(format!(
            "security type {} required but no credential path implemented",
            security_type
        )));
    }

    if version >= ProtocolVersion::V3_7 {
        outstream.write_bytes(&[SECURITY_TYPE_NONE]);
        outstream.flush().await?;
    }

    if expects_security_result(version, security_type) {
        check_security_result(instream, version).await?;
    }

    Ok(NegotiatedProtocol {
        version,
        security_type,
    })
}

async fn check_security_result<R: AsyncRead + Unpin>(
    instream: &mut RfbInStream<R>,
    version: ProtocolVersion,
) -> Result<(), RfbError> {
    let result: u32 = match instream.read_record().await {
        Ok(result) => result,
        Err(RfbError::UnexpectedEof { .. }) | Err(RfbError::Io(_)) => {
            return Err(RfbError::Authentication(
                "connection closed before security result".to_string(),
            ))
        }
        Err(e) => return Err(e),
    };

    if result == 0 {
        return Ok(());
    }

    // 3.8 servers explain the failure; older ones just close.
    let reason = if version >= ProtocolVersion::V3_8 {
        read_reason(instream)
            .await
            .unwrap_or_else(|_| "no reason given".to_string())
    } else {
        "no reason given".to_string()
    };
    Err(RfbError::Authentication(format!(
        "security handshake failed (result {}): {}",
        result, reason
    )))
}

/// Read a u32-length-prefixed failure reason.
async fn read_reason<R: AsyncRead + Unpin>(
    instream: &mut RfbInStream<R>,
) -> Result<String, RfbError> {
    let length: u32 = instream.read_record().await?;
    let reason = instream.read_exact(length as usize).await?;
    Ok(String::from_utf8_lossy(&reason).into_owned())
}

/// Send ClientInit message to the server.
pub async fn send_client_init<W: AsyncWrite + Unpin>(
    outstream: &mut RfbOutStream<W>,
    shared: bool,
) -> Result<(), RfbError> {
    outstream.send(&ClientInit { shared }).await
}

/// Receive ServerInit message from the server.
pub async fn recv_server_init<R: AsyncRead + Unpin>(
    instream: &mut RfbInStream<R>,
) -> Result<ServerInit, RfbError> {
    let header: ServerInitHeader = instream.read_record().await?;
    let name = instream.read_exact(header.name_length as usize).await?;

    Ok(ServerInit {
        framebuffer_width: header.framebuffer_width,
        framebuffer_height: header.framebuffer_height,
        pixel_format: header.pixel_format,
        name: String::from_utf8_lossy(&name).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::WireEncode;
    use crate::messages::types::PixelFormat;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

    /// Client streams wired to a raw server end.
    fn create_pair() -> (
        RfbInStream<tokio::io::ReadHalf<DuplexStream>>,
        RfbOutStream<tokio::io::WriteHalf<DuplexStream>>,
        DuplexStream,
    ) {
        let (client, server) = tokio::io::duplex(1024);
        let (read, write) = tokio::io::split(client);
        (RfbInStream::new(read), RfbOutStream::new(write), server)
    }

    async fn negotiate_banner(banner: &[u8; 12]) -> (Result<ProtocolVersion, RfbError>, Vec<u8>) {
        let (mut input, mut output, mut server) = create_pair();
        server.write_all(banner).await.unwrap();

        let result = negotiate_version(&mut input, &mut output).await;
        drop(output);
        drop(input);

        let mut echoed = Vec::new();
        server.read_to_end(&mut echoed).await.unwrap();
        (result, echoed)
    }

    #[tokio::test]
    async fn test_version_negotiation_echoes_supported_versions() {
        for banner in [b"RFB 003.003\n", b"RFB 003.007\n", b"RFB 003.008\n"] {
            let (result, echoed) = negotiate_banner(banner).await;
            let version = result.unwrap();
            assert_eq!(version.banner().as_bytes(), banner);
            assert_eq!(&echoed, banner);
        }
    }

    #[tokio::test]
    async fn test_version_above_max_is_clamped() {
        let (result, echoed) = negotiate_banner(b"RFB 003.889\n").await;
        assert_eq!(result.unwrap(), ProtocolVersion::V3_8);
        assert_eq!(&echoed, b"RFB 003.008\n");

        let (result, _) = negotiate_banner(b"RFB 004.001\n").await;
        assert_eq!(result.unwrap(), ProtocolVersion::V3_8);
    }

    #[tokio::test]
    async fn test_unsupported_version() {
        let (result, echoed) = negotiate_banner(b"RFB 002.001\n").await;
        match result {
            Err(RfbError::UnsupportedVersion { server }) => assert_eq!(server, "002.001"),
            other => panic!("expected UnsupportedVersion, got {:?}", other),
        }
        assert!(echoed.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_banner() {
        let (result, _) = negotiate_banner(b"HTTP/1.1 200").await;
        assert!(matches!(result, Err(RfbError::Protocol(_))));

        let (result, _) = negotiate_banner(b"RFB 00a.008\n").await;
        assert!(matches!(result, Err(RfbError::Protocol(_))));
    }

    #[test]
    fn test_version_ordering_uses_padded_text() {
        assert!(ProtocolVersion::new(3, 7) < ProtocolVersion::V3_8);
        assert!(ProtocolVersion::new(3, 889) > ProtocolVersion::V3_8);
        assert!(ProtocolVersion::new(2, 999) < ProtocolVersion::V3_3);
        assert_eq!(ProtocolVersion::V3_3.to_string(), "003.003");
    }

    #[test]
    fn test_security_preference_order() {
        assert_eq!(select_security_type(&[2, 1], false), Some(1));
        assert_eq!(select_security_type(&[2], false), Some(2));
        assert_eq!(select_security_type(&[30, 2, 1], false), Some(1));
        assert_eq!(select_security_type(&[2, 1, 30], true), Some(30));
        assert_eq!(select_security_type(&[16, 19], false), None);
    }

    #[test]
    fn test_security_result_expectations() {
        assert!(expects_security_result(ProtocolVersion::V3_8, 1));
        assert!(!expects_security_result(ProtocolVersion::V3_7, 1));
        assert!(!expects_security_result(ProtocolVersion::V3_3, 1));
        assert!(expects_security_result(ProtocolVersion::V3_3, 2));
        assert!(!expects_security_result(ProtocolVersion::V3_8, 30));
    }

    #[tokio::test]
    async fn test_security_none_3_8() {
        let (mut input, mut output, mut server) = create_pair();
        server.write_all(&[2, 2, 1]).await.unwrap(); // offers [2, 1]
        server.write_all(&[0, 0, 0, 0]).await.unwrap(); // result OK

        let negotiated = negotiate_security(&mut input, &mut output, ProtocolVersion::V3_8, false)
            .await
            .unwrap();
        assert_eq!(negotiated.security_type, SECURITY_TYPE_NONE);

        let mut ack = [0u8; 1];
        server.read_exact(&mut ack).await.unwrap();
        assert_eq!(ack, [1]);
    }

    #[tokio::test]
    async fn test_security_none_3_7_reads_no_result() {
        let (mut input, mut output, mut server) = create_pair();
        server.write_all(&[1, 1]).await.unwrap();
        // Bytes after the offer belong to ServerInit and must stay unread.
        server.write_all(&[0xAB]).await.unwrap();

        negotiate_security(&mut input, &mut output, ProtocolVersion::V3_7, false)
            .await
            .unwrap();
        assert_eq!(input.read_record::<u8>().await.unwrap(), 0xAB);
    }

    #[tokio::test]
    async fn test_security_none_3_3() {
        let (mut input, mut output, mut server) = create_pair();
        server.write_all(&[0, 0, 0, 1]).await.unwrap();

        let negotiated = negotiate_security(&mut input, &mut output, ProtocolVersion::V3_3, false)
            .await
            .unwrap();
        assert_eq!(negotiated.security_type, SECURITY_TYPE_NONE);
        // Nothing is sent back for 3.3.
        assert_eq!(output.buffered(), 0);
        drop(output);
        drop(input);
        let mut rest = Vec::new();
        server.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn test_password_only_fails_fast() {
        let (mut input, mut output, mut server) = create_pair();
        server.write_all(&[1, 2]).await.unwrap();

        let result =
            negotiate_security(&mut input, &mut output, ProtocolVersion::V3_8, false).await;
        match result {
            Err(RfbError::Authentication(msg)) => assert!(msg.contains("no credential path")),
            other => panic!("expected Authentication error, got {:?}", other),
        }

        // No selection byte was sent.
        drop(output);
        drop(input);
        let mut rest = Vec::new();
        server.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn test_zero_security_types() {
        let (mut input, mut output, mut server) = create_pair();
        server.write_all(&[0, 0, 0, 0, 4]).await.unwrap();
        server.write_all(b"busy").await.unwrap();

        let result =
            negotiate_security(&mut input, &mut output, ProtocolVersion::V3_8, false).await;
        match result {
            Err(RfbError::Authentication(msg)) => {
                assert!(msg.contains("no security types offered"));
                assert!(msg.contains("busy"));
            }
            other => panic!("expected Authentication error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_nonzero_security_result() {
        let (mut input, mut output, mut server) = create_pair();
        server.write_all(&[1, 1]).await.unwrap();
        server.write_all(&[0, 0, 0, 1, 0, 0, 0, 6]).await.unwrap();
        server.write_all(b"denied").await.unwrap();

        let result =
            negotiate_security(&mut input, &mut output, ProtocolVersion::V3_8, false).await;
        match result {
            Err(RfbError::Authentication(msg)) => assert!(msg.contains("denied")),
            other => panic!("expected Authentication error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_closed_before_security_result() {
        let (mut input, mut output, mut server) = create_pair();
        server.write_all(&[1, 1]).await.unwrap();
        server.shutdown().await.unwrap();

        let result =
            negotiate_security(&mut input, &mut output, ProtocolVersion::V3_8, false).await;
        assert!(matches!(result, Err(RfbError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_client_init_sent_shared_true() {
        let (_input, mut output, mut server) = create_pair();

        send_client_init(&mut output, true).await.unwrap();

        let mut shared = [0u8; 1];
        server.read_exact(&mut shared).await.unwrap();
        assert_eq!(shared, [1]);
    }

    #[tokio::test]
    async fn test_server_init_parsing() {
        let (mut input, _output, mut server) = create_pair();

        let header = ServerInitHeader {
            framebuffer_width: 1920,
            framebuffer_height: 1080,
            pixel_format: PixelFormat::rgb888(),
            name_length: 12,
        };
        server.write_all(&header.to_bytes()).await.unwrap();
        server.write_all(b"Test Desktop").await.unwrap();

        let server_init = recv_server_init(&mut input).await.unwrap();
        assert_eq!(server_init.framebuffer_width, 1920);
        assert_eq!(server_init.framebuffer_height, 1080);
        assert_eq!(server_init.pixel_format, PixelFormat::rgb888());
        assert_eq!(server_init.name, "Test Desktop");
    }
}
