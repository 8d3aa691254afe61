//! Configuration types for the VNC client.
//!
//! A [`Config`] can be built in code with [`Config::builder`] or loaded from
//! TOML:
//!
//! ```toml
//! [connection]
//! host = "10.0.2.15"
//! port = 5901
//! timeout_ms = 5000
//!
//! [display]
//! depth = 24
//! honor_server_endianness = true
//! ```

use crate::errors::RfbError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Complete VNC client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Connection settings.
    pub connection: ConnectionConfig,
    /// Display settings.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Server hostname or IP address.
    pub host: String,
    /// Server port (typically 5900 + display number).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Username. When set, vendor authentication (type 30) is preferred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// VNC password. Carried for callers; no password security type is negotiated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Connect and handshake read timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_port() -> u16 {
    5900
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Display configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Requested pixel depth. `None` adopts the server's format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u8>,
    /// Framebuffer width to use instead of the server's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u16>,
    /// Framebuffer height to use instead of the server's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u16>,
    /// Send the server's byte order back instead of the host's.
    #[serde(default)]
    pub honor_server_endianness: bool,
    /// Advertise bandwidth-sensitive encodings.
    #[serde(default = "default_true")]
    pub bandwidth_optimization: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            depth: None,
            width: None,
            height: None,
            honor_server_endianness: false,
            bandwidth_optimization: default_true(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig {
                host: String::new(),
                port: default_port(),
                username: None,
                password: None,
                timeout_ms: default_timeout_ms(),
            },
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, RfbError> {
        let config: Config = toml::from_str(text)
            .map_err(|e| RfbError::Config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RfbError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            RfbError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RfbError::Config`] if any configuration values are invalid.
    pub fn validate(&self) -> Result<(), RfbError> {
        if self.connection.host.is_empty() {
            return Err(RfbError::Config("Host cannot be empty".to_string()));
        }

        if self.connection.port == 0 {
            return Err(RfbError::Config("Port cannot be 0".to_string()));
        }

        if self.connection.timeout_ms == 0 {
            return Err(RfbError::Config("Timeout cannot be 0".to_string()));
        }

        match (self.display.width, self.display.height) {
            (Some(0), _) | (_, Some(0)) => {
                return Err(RfbError::Config(
                    "Framebuffer width and height must be non-zero".to_string(),
                ))
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(RfbError::Config(
                    "Framebuffer width and height must be given together".to_string(),
                ))
            }
            _ => {}
        }

        Ok(())
    }

    /// Returns the connect and handshake timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.connection.timeout_ms)
    }
}

/// Builder for creating a `Config`.
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Sets the server hostname or IP address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.connection.host = host.into();
        self
    }

    /// Sets the server port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.connection.port = port;
        self
    }

    /// Sets the username.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.connection.username = Some(username.into());
        self
    }

    /// Sets the VNC password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.connection.password = Some(password.into());
        self
    }

    /// Sets the connect and handshake timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.connection.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Requests a pixel depth.
    #[must_use]
    pub fn depth(mut self, depth: u8) -> Self {
        self.config.display.depth = Some(depth);
        self
    }

    /// Overrides the framebuffer size reported by the server.
    #[must_use]
    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.config.display.width = Some(width);
        self.config.display.height = Some(height);
        self
    }

    /// Sends the server's byte order back instead of the host's.
    #[must_use]
    pub fn honor_server_endianness(mut self, honor: bool) -> Self {
        self.config.display.honor_server_endianness = honor;
        self
    }

    /// Enables or disables bandwidth-sensitive encodings.
    #[must_use]
    pub fn bandwidth_optimization(mut self, enabled: bool) -> Self {
        self.config.display.bandwidth_optimization = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<Config, RfbError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
