//! The `Codec` trait implemented by every wire type in this crate.

use crate::CodecResult;

/// A type with a deterministic, schema-driven binary encoding.
///
/// `decode(encode(x)) == x` is required for every implementor: replicas
/// that decode and re-encode a previously committed value must
/// reproduce identical bytes, or state roots would diverge.
pub trait Codec: Sized {
    /// Encode `self`, appending to `buf`.
    fn encode_to(&self, buf: &mut Vec<u8>);

    /// Decode a value from the front of `buf`, returning it and the
    /// number of bytes consumed.
    fn decode_from(buf: &[u8]) -> CodecResult<(Self, usize)>;

    /// Encode `self` into a fresh buffer.
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_to(&mut buf);
        buf
    }

    /// Decode a value occupying the entirety of `buf`.
    fn decode(buf: &[u8]) -> CodecResult<Self> {
        let (value, n) = Self::decode_from(buf)?;
        if n != buf.len() {
            return Err(crate::CodecError::Malformed(format!(
                "trailing bytes: consumed {n} of {}",
                buf.len()
            )));
        }
        Ok(value)
    }
}

/// Encode a `Vec<T: Codec>` as a count followed by each element in order.
pub fn encode_vec<T: Codec>(buf: &mut Vec<u8>, items: &[T]) {
    crate::primitives::encode_count(buf, items.len());
    for item in items {
        item.encode_to(buf);
    }
}

/// Decode a `Vec<T: Codec>` encoded by [`encode_vec`].
pub fn decode_vec<T: Codec>(buf: &[u8]) -> CodecResult<(Vec<T>, usize)> {
    let (count, mut offset) = crate::primitives::decode_count(buf)?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let (item, n) = T::decode_from(&buf[offset..])?;
        items.push(item);
        offset += n;
    }
    Ok((items, offset))
}
