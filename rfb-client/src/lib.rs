//! Async RFB (VNC) client for scripted test consoles.
//!
//! A [`Session`] logs in to a VNC server, captures the framebuffer on demand
//! and injects keyboard and pointer events. It is built on the low-level
//! `rfb-protocol` wire layer and the `rfb-encodings` decoders.
//!
//! # Quick Start
//!
//! ```no_run
//! use rfb_client::{Config, Session};
//!
//! # async fn example() -> Result<(), rfb_client::RfbError> {
//! let config = Config::builder().host("localhost").port(5900).build()?;
//!
//! let mut session = Session::new(config);
//! session.login().await?;
//!
//! let frame = session.capture().await?;
//! println!("{}x{}", frame.width(), frame.height());
//!
//! session.type_string("root").await?;
//! session.press_key(rfb_client::keysym::RETURN).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Control flow
//!
//! - **`login`**: connect, version and security handshake, ClientInit/ServerInit,
//!   SetPixelFormat and SetEncodings
//! - **`capture`**: request an update, then process server messages until none
//!   arrives for [`protocol::POLL_INTERVAL`]
//! - **Events**: key and pointer messages go out immediately, independent of
//!   capture
//!
//! There are no background tasks. Every method takes `&mut self`, so one
//! session is driven by one caller at a time.
//!
//! # Error Handling
//!
//! All operations return [`RfbError`]; use [`RfbError::class`] for the broad
//! category. A failed `login` or `capture` drops the connection.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

// Public modules
pub mod config;
pub mod display;
pub mod errors;
pub mod input;
pub mod keysym;
pub mod protocol;
pub mod protocol_trace;
pub mod transport;

// Private implementation modules
mod framebuffer;

// Re-exports
pub use config::{Config, ConfigBuilder, ConnectionConfig, DisplayConfig};
pub use display::DisplayInfo;
pub use errors::{ErrorClass, Result, RfbError};
pub use input::ButtonMask;
pub use rfb_pixelbuffer::ManagedPixelBuffer;
pub use rfb_protocol::handshake::{NegotiatedProtocol, ProtocolVersion};
pub use rfb_protocol::messages::PixelFormat;

use framebuffer::Framebuffer;
use rfb_protocol::handshake;
use rfb_protocol::io::RfbOutStream;
use tokio::net::tcp::OwnedWriteHalf;
use transport::Transport;

/// One VNC connection and the state negotiated over it.
pub struct Session {
    config: Config,
    transport: Option<Transport>,
    negotiated: Option<NegotiatedProtocol>,
    display: Option<DisplayInfo>,
    framebuffer: Option<Framebuffer>,
    pointer: (u16, u16),
}

impl Session {
    /// Create a disconnected session. Nothing touches the network until
    /// [`login`](Self::login).
    pub fn new(config: Config) -> Self {
        Self {
            config,
            transport: None,
            negotiated: None,
            display: None,
            framebuffer: None,
            pointer: (0, 0),
        }
    }

    /// The configuration this session was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Connect and run the full handshake.
    ///
    /// On success the session is ready for [`capture`](Self::capture) and
    /// input events. On failure no connection is kept.
    pub async fn login(&mut self) -> Result<()> {
        self.config.validate()?;
        self.logout();

        let conn = &self.config.connection;
        let timeout = self.config.timeout();
        let mut transport = Transport::connect(&conn.host, conn.port, timeout).await?;
        transport.set_read_timeout(Some(timeout));

        let (input, output) = transport.streams();
        let version = handshake::negotiate_version(input, output).await?;
        let negotiated =
            handshake::negotiate_security(input, output, version, conn.username.is_some())
                .await?;
        let info = display::initialize(input, output, &self.config.display).await?;

        transport.set_read_timeout(None);
        tracing::info!(
            "Logged in to {} (RFB {}, security type {}): {}x{} {:?}",
            transport.peer_addr(),
            negotiated.version,
            negotiated.security_type,
            info.width,
            info.height,
            info.name
        );

        self.transport = Some(transport);
        self.negotiated = Some(negotiated);
        self.display = Some(info);
        Ok(())
    }

    /// Close the connection and forget all negotiated state.
    pub fn logout(&mut self) {
        if let Some(transport) = self.transport.take() {
            tracing::info!("Disconnecting from {}", transport.peer_addr());
        }
        self.negotiated = None;
        self.display = None;
        self.framebuffer = None;
        self.pointer = (0, 0);
    }

    /// Whether a connection is open.
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Version and security type agreed during login.
    pub fn negotiated(&self) -> Option<&NegotiatedProtocol> {
        self.negotiated.as_ref()
    }

    /// Pixel format sent to the server.
    pub fn pixel_format(&self) -> Option<&PixelFormat> {
        self.display.as_ref().map(|d| &d.pixel_format)
    }

    /// Desktop name reported by the server.
    pub fn desktop_name(&self) -> Option<&str> {
        self.display.as_ref().map(|d| d.name.as_str())
    }

    /// Current framebuffer size: the allocated buffer once captured, the
    /// negotiated size before that.
    pub fn size(&self) -> Option<(u16, u16)> {
        match (&self.framebuffer, &self.display) {
            (Some(fb), _) => Some(fb.size()),
            (None, Some(d)) => Some((d.width, d.height)),
            (None, None) => None,
        }
    }

    /// The framebuffer as of the last capture.
    pub fn framebuffer(&self) -> Option<&ManagedPixelBuffer> {
        self.framebuffer.as_ref().map(Framebuffer::buffer)
    }

    /// Request an update and apply everything the server sends.
    ///
    /// The first capture asks for a full update; later ones are incremental.
    /// The returned buffer is reused by the next capture; clone it to keep a
    /// snapshot. An error closes the connection but keeps rectangles already
    /// applied.
    pub async fn capture(&mut self) -> Result<&ManagedPixelBuffer> {
        let info = self.display.as_ref().ok_or(RfbError::NotConnected)?;
        let transport = self.transport.as_mut().ok_or(RfbError::NotConnected)?;

        let incremental = self.framebuffer.is_some();
        let framebuffer = self
            .framebuffer
            .get_or_insert_with(|| Framebuffer::new(info.width, info.height));
        let (width, height) = framebuffer.size();

        let outcome = match protocol::write_framebuffer_update_request(
            transport.output(),
            incremental,
            width,
            height,
        )
        .await
        {
            Ok(()) => protocol::pump_server_messages(transport.input(), framebuffer).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(handled) => {
                tracing::debug!("Capture processed {} server messages", handled);
                Ok(framebuffer.buffer())
            }
            Err(e) => {
                tracing::debug!("Capture failed, closing connection: {}", e);
                self.transport = None;
                Err(e)
            }
        }
    }

    fn output(&mut self) -> Result<&mut RfbOutStream<OwnedWriteHalf>> {
        self.transport
            .as_mut()
            .map(Transport::output)
            .ok_or(RfbError::NotConnected)
    }

    /// Send a KeyEvent.
    pub async fn send_key(&mut self, down: bool, keysym: u32) -> Result<()> {
        input::send_key(self.output()?, down, keysym).await
    }

    /// Press a key without releasing it.
    pub async fn key_down(&mut self, keysym: u32) -> Result<()> {
        self.send_key(true, keysym).await
    }

    /// Release a key.
    pub async fn key_up(&mut self, keysym: u32) -> Result<()> {
        self.send_key(false, keysym).await
    }

    /// Press and release a key.
    pub async fn press_key(&mut self, keysym: u32) -> Result<()> {
        self.key_down(keysym).await?;
        self.key_up(keysym).await
    }

    /// Send a PointerEvent and remember the position.
    pub async fn send_pointer(&mut self, buttons: ButtonMask, x: u16, y: u16) -> Result<()> {
        input::send_pointer(self.output()?, buttons, x, y).await?;
        self.pointer = (x, y);
        Ok(())
    }

    /// Move the pointer with no buttons held.
    pub async fn move_to(&mut self, x: u16, y: u16) -> Result<()> {
        self.send_pointer(ButtonMask::empty(), x, y).await
    }

    /// Left click at the current pointer position.
    pub async fn click(&mut self) -> Result<()> {
        self.click_with(ButtonMask::LEFT).await
    }

    /// Right click at the current pointer position.
    pub async fn right_click(&mut self) -> Result<()> {
        self.click_with(ButtonMask::RIGHT).await
    }

    async fn click_with(&mut self, buttons: ButtonMask) -> Result<()> {
        let (x, y) = self.pointer;
        self.send_pointer(buttons, x, y).await?;
        self.send_pointer(ButtonMask::empty(), x, y).await
    }

    /// Type ASCII text as a sequence of key presses.
    ///
    /// Fails with [`RfbError::UnsupportedFeature`] before sending anything if
    /// `text` contains a non-ASCII character.
    pub async fn type_string(&mut self, text: &str) -> Result<()> {
        input::type_string(self.output()?, text).await
    }
}
