//! Fixed-layout big-endian wire codec.
//!
//! Every multi-byte integer in the RFB protocol is transmitted in network byte
//! order. This module is the only place that knows about byte order: the rest
//! of the workspace encodes and decodes through the primitives and the
//! [`WireEncode`] / [`WireDecode`] traits defined here.
//!
//! The codec is pure. It performs no I/O and keeps no state, so every record
//! can be tested against a byte slice in isolation.
//!
//! # Examples
//!
//! ```
//! use bytes::BytesMut;
//! use rfb_protocol::codec;
//!
//! let mut buf = BytesMut::new();
//! codec::put_u16(&mut buf, 1920);
//! codec::put_encoding(&mut buf, -223);
//! assert_eq!(&buf[..], &[0x07, 0x80, 0xFF, 0xFF, 0xFF, 0x21]);
//!
//! let mut input = buf.freeze();
//! assert_eq!(codec::get_u16(&mut input).unwrap(), 1920);
//! assert_eq!(codec::get_i32(&mut input).unwrap(), -223);
//! ```

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;

/// Failure to decode a fixed-size record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Fewer bytes were available than the field or record requires.
    #[error("truncated record: needed {needed} bytes, {available} available")]
    Truncated {
        /// Bytes required by the field being decoded.
        needed: usize,
        /// Bytes left in the input.
        available: usize,
    },
}

/// A record with a fixed wire layout that can be written to a buffer.
pub trait WireEncode {
    /// Number of bytes [`encode`](Self::encode) appends.
    fn encoded_len(&self) -> usize;

    /// Append the wire representation of `self` to `buf`.
    fn encode<B: BufMut>(&self, buf: &mut B);

    /// Encode into a freshly allocated buffer.
    fn to_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf
    }
}

/// A record with a fixed wire size that can be decoded from a buffer.
pub trait WireDecode: Sized {
    /// Exact number of bytes the record occupies on the wire.
    const SIZE: usize;

    /// Decode one record, consuming exactly [`SIZE`](Self::SIZE) bytes.
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, CodecError>;
}

#[inline]
fn ensure<B: Buf>(buf: &B, needed: usize) -> Result<(), CodecError> {
    if buf.remaining() < needed {
        return Err(CodecError::Truncated {
            needed,
            available: buf.remaining(),
        });
    }
    Ok(())
}

/// Decode an unsigned 8-bit field.
pub fn get_u8<B: Buf>(buf: &mut B) -> Result<u8, CodecError> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

/// Decode a big-endian unsigned 16-bit field.
pub fn get_u16<B: Buf>(buf: &mut B) -> Result<u16, CodecError> {
    ensure(buf, 2)?;
    Ok(buf.get_u16())
}

/// Decode a big-endian unsigned 32-bit field.
pub fn get_u32<B: Buf>(buf: &mut B) -> Result<u32, CodecError> {
    ensure(buf, 4)?;
    Ok(buf.get_u32())
}

/// Decode a big-endian signed 32-bit field (encoding identifiers).
pub fn get_i32<B: Buf>(buf: &mut B) -> Result<i32, CodecError> {
    ensure(buf, 4)?;
    Ok(buf.get_i32())
}

/// Decode a boolean flag byte. Any nonzero value is true.
pub fn get_flag<B: Buf>(buf: &mut B) -> Result<bool, CodecError> {
    Ok(get_u8(buf)? != 0)
}

/// Skip `n` padding bytes.
pub fn skip<B: Buf>(buf: &mut B, n: usize) -> Result<(), CodecError> {
    ensure(buf, n)?;
    buf.advance(n);
    Ok(())
}

/// Encode an unsigned 8-bit field.
pub fn put_u8<B: BufMut>(buf: &mut B, value: u8) {
    buf.put_u8(value);
}

/// Encode a big-endian unsigned 16-bit field.
pub fn put_u16<B: BufMut>(buf: &mut B, value: u16) {
    buf.put_u16(value);
}

/// Encode a big-endian unsigned 32-bit field.
pub fn put_u32<B: BufMut>(buf: &mut B, value: u32) {
    buf.put_u32(value);
}

/// Encode a boolean flag as 0 or 1.
pub fn put_flag<B: BufMut>(buf: &mut B, value: bool) {
    buf.put_u8(u8::from(value));
}

/// Encode `n` zero padding bytes.
pub fn put_padding<B: BufMut>(buf: &mut B, n: usize) {
    buf.put_bytes(0, n);
}

/// Encode a signed encoding identifier.
///
/// The two's-complement bit pattern is written as an unsigned big-endian
/// value, so pseudo-encodings such as `-223` go out as `FF FF FF 21`.
pub fn put_encoding<B: BufMut>(buf: &mut B, id: i32) {
    buf.put_u32(u32::from_be_bytes(id.to_be_bytes()));
}

macro_rules! primitive_record {
    ($ty:ty, $size:expr, $get:ident) => {
        impl WireDecode for $ty {
            const SIZE: usize = $size;

            fn decode<B: Buf>(buf: &mut B) -> Result<Self, CodecError> {
                $get(buf)
            }
        }
    };
}

primitive_record!(u8, 1, get_u8);
primitive_record!(u16, 2, get_u16);
primitive_record!(u32, 4, get_u32);
primitive_record!(i32, 4, get_i32);

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_big_endian_fields() {
        let mut buf = BytesMut::new();
        put_u8(&mut buf, 0xAB);
        put_u16(&mut buf, 0x1234);
        put_u32(&mut buf, 0xDEAD_BEEF);
        assert_eq!(&buf[..], &[0xAB, 0x12, 0x34, 0xDE, 0xAD, 0xBE, 0xEF]);

        let mut input = buf.freeze();
        assert_eq!(get_u8(&mut input).unwrap(), 0xAB);
        assert_eq!(get_u16(&mut input).unwrap(), 0x1234);
        assert_eq!(get_u32(&mut input).unwrap(), 0xDEAD_BEEF);
        assert!(!input.has_remaining());
    }

    #[test]
    fn test_encoding_ids_use_twos_complement_bit_pattern() {
        let mut buf = BytesMut::new();
        put_encoding(&mut buf, -223);
        put_encoding(&mut buf, 0);
        put_encoding(&mut buf, 16);
        assert_eq!(
            &buf[..],
            &[0xFF, 0xFF, 0xFF, 0x21, 0, 0, 0, 0, 0, 0, 0, 0x10]
        );

        let mut input = buf.freeze();
        assert_eq!(get_i32(&mut input).unwrap(), -223);
    }

    #[test]
    fn test_short_input_is_framing_error() {
        let mut input = Bytes::from_static(&[0x01, 0x02, 0x03]);
        let err = get_u32(&mut input).unwrap_err();
        assert_eq!(
            err,
            CodecError::Truncated {
                needed: 4,
                available: 3
            }
        );
        // Nothing was consumed by the failed read.
        assert_eq!(input.remaining(), 3);
    }

    #[test]
    fn test_padding_and_flags() {
        let mut buf = BytesMut::new();
        put_flag(&mut buf, true);
        put_padding(&mut buf, 3);
        put_flag(&mut buf, false);
        assert_eq!(&buf[..], &[1, 0, 0, 0, 0]);

        let mut input = buf.freeze();
        assert!(get_flag(&mut input).unwrap());
        skip(&mut input, 3).unwrap();
        assert!(!get_flag(&mut input).unwrap());
        assert!(skip(&mut input, 1).is_err());
    }
}
