//! Static table of known encodings.
//!
//! The table drives the SetEncodings message: supported entries are
//! advertised in descending id order, and bandwidth-sensitive entries are
//! left out when the session disables bandwidth optimization.

use crate::{
    ENCODING_COPYRECT, ENCODING_HEXTILE, ENCODING_RAW, ENCODING_RRE, ENCODING_ZRLE,
    PSEUDO_ENCODING_CURSOR, PSEUDO_ENCODING_DESKTOP_SIZE,
};

/// One entry in the encoding registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingDescriptor {
    pub id: i32,
    pub name: &'static str,
    /// A decoder exists for this encoding.
    pub supported: bool,
    /// Only worth advertising when bandwidth optimization is on.
    pub bandwidth_sensitive: bool,
}

impl EncodingDescriptor {
    const fn new(id: i32, name: &'static str, supported: bool, bandwidth_sensitive: bool) -> Self {
        Self {
            id,
            name,
            supported,
            bandwidth_sensitive,
        }
    }
}

/// Every encoding the client recognises.
pub static REGISTRY: &[EncodingDescriptor] = &[
    EncodingDescriptor::new(ENCODING_RAW, "Raw", true, false),
    EncodingDescriptor::new(ENCODING_COPYRECT, "CopyRect", false, false),
    EncodingDescriptor::new(ENCODING_RRE, "RRE", false, false),
    EncodingDescriptor::new(ENCODING_HEXTILE, "Hextile", false, false),
    EncodingDescriptor::new(ENCODING_ZRLE, "ZRLE", false, true),
    EncodingDescriptor::new(PSEUDO_ENCODING_DESKTOP_SIZE, "DesktopSize", true, false),
    EncodingDescriptor::new(PSEUDO_ENCODING_CURSOR, "Cursor", false, false),
];

/// Find the registry entry for `id`.
pub fn lookup(id: i32) -> Option<&'static EncodingDescriptor> {
    REGISTRY.iter().find(|d| d.id == id)
}

/// Encoding ids to advertise, sorted by descending id.
///
/// ```
/// use rfb_encodings::{advertised_encodings, REGISTRY};
///
/// assert_eq!(advertised_encodings(REGISTRY, true), vec![0, -223]);
/// ```
pub fn advertised_encodings(
    descriptors: &[EncodingDescriptor],
    bandwidth_optimization: bool,
) -> Vec<i32> {
    let mut ids: Vec<i32> = descriptors
        .iter()
        .filter(|d| d.supported)
        .filter(|d| bandwidth_optimization || !d.bandwidth_sensitive)
        .map(|d| d.id)
        .collect();
    ids.sort_unstable_by(|a, b| b.cmp(a));
    ids
}
