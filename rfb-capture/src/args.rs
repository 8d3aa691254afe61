//! Command-line arguments and their mapping onto a client [`Config`].

use anyhow::{bail, Context, Result};
use clap::Parser;
use rfb_client::Config;
use std::path::PathBuf;
use std::time::Duration;

/// Capture a VNC desktop and optionally drive it.
#[derive(Parser, Debug, Clone)]
#[command(name = "rfb-capture")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// VNC server address (host, host:display or host:port)
    ///
    /// Display numbers below 100 map to port 5900 + display. May be omitted
    /// when the configuration file names a host.
    #[arg(value_name = "SERVER")]
    pub server: Option<String>,

    /// Server port (overrides the port in SERVER)
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Username; makes vendor authentication the preferred security type
    #[arg(short = 'u', long, value_name = "USER", env = "VNC_USERNAME")]
    pub username: Option<String>,

    /// Password (prefer the VNC_PASSWORD env var)
    #[arg(short = 'P', long, value_name = "PASSWORD", env = "VNC_PASSWORD")]
    pub password: Option<String>,

    /// Configuration file path (TOML format)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Requested pixel depth
    #[arg(long, value_name = "BITS")]
    pub depth: Option<u8>,

    /// Connect and handshake timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Do not advertise bandwidth-sensitive encodings
    #[arg(long)]
    pub no_bandwidth_optimization: bool,

    /// Click the left button at X,Y before capturing
    #[arg(long, value_name = "X,Y", value_parser = parse_point)]
    pub click: Option<(u16, u16)>,

    /// Type this printable ASCII text before capturing
    #[arg(short = 't', long = "type", value_name = "TEXT")]
    pub type_text: Option<String>,

    /// Press a named key (Return, Escape, F1, ...) before capturing; repeatable
    #[arg(short = 'k', long = "key", value_name = "KEY")]
    pub keys: Vec<String>,

    /// Number of captures to run; the last one is saved
    #[arg(short = 'n', long, default_value_t = 1)]
    pub frames: u32,

    /// Pause between captures in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 200)]
    pub interval_ms: u64,

    /// Output PNG path
    #[arg(short = 'o', long, value_name = "FILE", default_value = "screen.png")]
    pub output: PathBuf,

    /// Log every RFB message sent and received
    #[arg(long)]
    pub trace: bool,

    /// Enable verbose logging (-v debug, -vv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Build the client configuration: file first, then flags on top.
    pub fn to_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config file '{}'", path.display()))?,
            None => Config::default(),
        };

        if let Some(server) = &self.server {
            let (host, port) = parse_server_address(server)?;
            config.connection.host = host;
            config.connection.port = port;
        }
        if let Some(port) = self.port {
            config.connection.port = port;
        }
        if let Some(username) = &self.username {
            config.connection.username = Some(username.clone());
        }
        if let Some(password) = &self.password {
            config.connection.password = Some(password.clone());
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.connection.timeout_ms = timeout_ms;
        }
        if let Some(depth) = self.depth {
            config.display.depth = Some(depth);
        }
        if self.no_bandwidth_optimization {
            config.display.bandwidth_optimization = false;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Pause between captures.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Parse "host", "host:display" or "host:port".
///
/// VNC display numbers (0-99) are converted to port numbers (5900-5999).
fn parse_server_address(server: &str) -> Result<(String, u16)> {
    match server.rsplit_once(':') {
        Some((host, port_or_display)) => {
            let num: u16 = port_or_display
                .parse()
                .with_context(|| format!("Invalid port or display number: {}", port_or_display))?;
            let port = if num < 100 { 5900 + num } else { num };
            Ok((host.to_string(), port))
        }
        None => Ok((server.to_string(), 5900)),
    }
}

/// Parse "X,Y" into a pointer position.
fn parse_point(s: &str) -> Result<(u16, u16)> {
    let Some((x, y)) = s.split_once(',') else {
        bail!("expected X,Y, got '{}'", s);
    };
    let x = x.trim().parse().with_context(|| format!("invalid X in '{}'", s))?;
    let y = y.trim().parse().with_context(|| format!("invalid Y in '{}'", s))?;
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_server_address() {
        assert_eq!(
            parse_server_address("localhost").unwrap(),
            ("localhost".to_string(), 5900)
        );
        assert_eq!(
            parse_server_address("10.0.2.15:1").unwrap(),
            ("10.0.2.15".to_string(), 5901)
        );
        assert_eq!(
            parse_server_address("vm:5905").unwrap(),
            ("vm".to_string(), 5905)
        );
        assert!(parse_server_address("vm:display").is_err());
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("10,20").unwrap(), (10, 20));
        assert_eq!(parse_point(" 3 , 4 ").unwrap(), (3, 4));
        assert!(parse_point("10").is_err());
        assert!(parse_point("-1,2").is_err());
    }

    #[test]
    fn test_flags_to_config() {
        let args = Args::try_parse_from([
            "rfb-capture",
            "vm:2",
            "--depth",
            "24",
            "-u",
            "tester",
            "--no-bandwidth-optimization",
            "--click",
            "5,6",
            "-k",
            "Return",
            "-k",
            "F2",
            "-vv",
        ])
        .unwrap();

        let config = args.to_config().unwrap();
        assert_eq!(config.connection.host, "vm");
        assert_eq!(config.connection.port, 5902);
        assert_eq!(config.connection.username.as_deref(), Some("tester"));
        assert_eq!(config.display.depth, Some(24));
        assert!(!config.display.bandwidth_optimization);
        assert_eq!(args.click, Some((5, 6)));
        assert_eq!(args.keys, vec!["Return", "F2"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.frames, 1);
    }

    #[test]
    fn test_missing_host_is_rejected() {
        let args = Args::try_parse_from(["rfb-capture"]).unwrap();
        assert!(args.to_config().is_err());
    }
}
