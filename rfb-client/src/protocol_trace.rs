//! Opt-in message trace.
//!
//! Set `RUST_VNC_TRACE=1` to log every message sent or received at info level
//! under the `protocol_trace` target.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};

static TRACE_ENABLED: Lazy<AtomicBool> = Lazy::new(|| {
    let on = std::env::var("RUST_VNC_TRACE")
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE"))
        .unwrap_or(false);
    AtomicBool::new(on)
});

/// Whether tracing is on.
#[inline]
pub fn enabled() -> bool {
    TRACE_ENABLED.load(Ordering::Relaxed)
}

/// Turn tracing on or off at runtime, overriding the environment.
#[inline]
pub fn set_enabled(on: bool) {
    TRACE_ENABLED.store(on, Ordering::Relaxed)
}

#[inline]
pub(crate) fn out_msg(name: &str, fields: impl FnOnce() -> String) {
    if enabled() {
        tracing::info!(target: "protocol_trace", "OUT {} {}", name, fields());
    }
}

#[inline]
pub(crate) fn in_msg(name: &str, fields: impl FnOnce() -> String) {
    if enabled() {
        tracing::info!(target: "protocol_trace", "IN  {} {}", name, fields());
    }
}

/// Log up to `max` bytes of `data` as hex, 16 per line.
pub(crate) fn hexdump(prefix: &str, data: &[u8], max: usize) {
    if !enabled() || data.is_empty() {
        return;
    }
    for line in data[..max.min(data.len())].chunks(16) {
        let hex: Vec<String> = line.iter().map(|b| format!("{:02X}", b)).collect();
        tracing::info!(target: "protocol_trace", "{} {}", prefix, hex.join(" "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_only_formatted_when_enabled() {
        set_enabled(false);
        out_msg("KeyEvent", || panic!("formatted while disabled"));
        in_msg("Bell", || panic!("formatted while disabled"));
        hexdump("cut", &[1, 2, 3], 16);
    }
}
