//! Error types for the RFB client.
//!
//! The client shares a single error type with the wire layer so that a
//! failure keeps its class from the socket up to the caller.

pub use rfb_protocol::errors::{ErrorClass, RfbError};

/// Result alias used throughout the client.
pub type Result<T> = std::result::Result<T, RfbError>;
