//! Low-level length-prefixed encode/decode primitives.
//!
//! # Binary Format
//!
//! All byte strings are length-prefixed with a 4-byte big-endian count,
//! so lexicographic byte order of the length prefix matches numeric
//! order, which the composite trie key relies on for prefix-freedom
//! (`composite_key`, below). All integers are likewise big-endian.
//! Collections are prefixed with a 4-byte big-endian count of elements.
//!
//! Every encoder in this crate is paired with a decoder that consumes
//! exactly the bytes the encoder produced and returns the number of bytes
//! read, so callers can decode a sequence of records back to back.

use byteorder::{BigEndian, ByteOrder};

use crate::{CodecError, CodecResult};

/// Encode a `u64` as 8 big-endian bytes.
pub fn encode_u64(buf: &mut Vec<u8>, v: u64) {
    let mut tmp = [0u8; 8];
    BigEndian::write_u64(&mut tmp, v);
    buf.extend_from_slice(&tmp);
}

/// Decode a `u64` from 8 big-endian bytes at `buf[0..8]`.
pub fn decode_u64(buf: &[u8]) -> CodecResult<(u64, usize)> {
    if buf.len() < 8 {
        return Err(CodecError::Truncated {
            needed: 8,
            available: buf.len(),
        });
    }
    Ok((BigEndian::read_u64(&buf[..8]), 8))
}

/// Encode a length-prefixed byte string: `len(4) ∥ bytes`.
pub fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    let mut tmp = [0u8; 4];
    BigEndian::write_u32(&mut tmp, bytes.len() as u32);
    buf.extend_from_slice(&tmp);
    buf.extend_from_slice(bytes);
}

/// Decode a length-prefixed byte string, returning the bytes and the
/// number of input bytes consumed (including the 4-byte prefix).
pub fn decode_bytes(buf: &[u8]) -> CodecResult<(Vec<u8>, usize)> {
    if buf.len() < 4 {
        return Err(CodecError::Truncated {
            needed: 4,
            available: buf.len(),
        });
    }
    let len = BigEndian::read_u32(&buf[..4]) as usize;
    if buf.len() < 4 + len {
        return Err(CodecError::Truncated {
            needed: 4 + len,
            available: buf.len(),
        });
    }
    Ok((buf[4..4 + len].to_vec(), 4 + len))
}

/// Encode a length-prefixed UTF-8 string.
pub fn encode_str(buf: &mut Vec<u8>, s: &str) {
    encode_bytes(buf, s.as_bytes());
}

/// Decode a length-prefixed UTF-8 string.
pub fn decode_str(buf: &[u8]) -> CodecResult<(String, usize)> {
    let (bytes, n) = decode_bytes(buf)?;
    let s = String::from_utf8(bytes).map_err(|e| CodecError::Malformed(e.to_string()))?;
    Ok((s, n))
}

/// Encode a 4-byte big-endian element count, the header of every
/// variable-length collection encoding.
pub fn encode_count(buf: &mut Vec<u8>, count: usize) {
    let mut tmp = [0u8; 4];
    BigEndian::write_u32(&mut tmp, count as u32);
    buf.extend_from_slice(&tmp);
}

/// Decode a 4-byte big-endian element count.
pub fn decode_count(buf: &[u8]) -> CodecResult<(usize, usize)> {
    if buf.len() < 4 {
        return Err(CodecError::Truncated {
            needed: 4,
            available: buf.len(),
        });
    }
    Ok((BigEndian::read_u32(&buf[..4]) as usize, 4))
}

/// Encode a single byte (used for enum tags).
pub fn encode_tag(buf: &mut Vec<u8>, tag: u8) {
    buf.push(tag);
}

/// Decode a single tag byte.
pub fn decode_tag(buf: &[u8]) -> CodecResult<(u8, usize)> {
    buf.first()
        .copied()
        .map(|b| (b, 1))
        .ok_or(CodecError::Truncated {
            needed: 1,
            available: 0,
        })
}
