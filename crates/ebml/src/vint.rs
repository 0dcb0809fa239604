//! Coded-integer (VINT) codec.
//!
//! A coded integer occupies 1 to 8 bytes. The position of the leading set
//! bit in the first byte (the marker) gives the total width: bit 7 means one
//! byte, bit 6 two bytes, down to bit 0 for eight bytes. The marker and the
//! zero bits above it are not part of the value; the remaining bits of the
//! first byte and all following bytes form the value, big-endian.
//!
//! ```
//! use ebml::vint::{self, WidthClass};
//!
//! assert_eq!(vint::encode(100), (WidthClass::A, vec![0xE4]));
//! assert_eq!(vint::decode(&[0x41, 0x00]), (WidthClass::B, 0x0100));
//! ```

use crate::EbmlError;

/// Widest coded integer, in bytes.
pub const MAX_WIDTH: usize = 8;

/// Largest value a coded integer can carry (7 value bits per byte).
pub const MAX_VALUE: u64 = (1 << (7 * MAX_WIDTH)) - 1;

/// Byte-length category of a coded integer.
///
/// `None` is the sentinel for a first byte with no marker bit (`0x00`), which
/// denotes malformed or reserved-width data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum WidthClass {
    #[default]
    None = 0,
    A = 1,
    B = 2,
    C = 3,
    D = 4,
    E = 5,
    F = 6,
    G = 7,
    H = 8,
}

impl WidthClass {
    /// Determines the class from the first byte of a coded integer.
    #[inline]
    pub fn from_marker(first: u8) -> Self {
        match first.leading_zeros() {
            0 => WidthClass::A,
            1 => WidthClass::B,
            2 => WidthClass::C,
            3 => WidthClass::D,
            4 => WidthClass::E,
            5 => WidthClass::F,
            6 => WidthClass::G,
            7 => WidthClass::H,
            _ => WidthClass::None,
        }
    }

    /// Returns the class occupying `width` bytes, or `None` outside `1..=8`.
    pub fn from_width(width: usize) -> Self {
        match width {
            1 => WidthClass::A,
            2 => WidthClass::B,
            3 => WidthClass::C,
            4 => WidthClass::D,
            5 => WidthClass::E,
            6 => WidthClass::F,
            7 => WidthClass::G,
            8 => WidthClass::H,
            _ => WidthClass::None,
        }
    }

    /// Total encoded length in bytes (0 for the sentinel).
    #[inline]
    pub fn width(self) -> usize {
        self as usize
    }

    /// Returns `true` for the "no marker found" sentinel.
    #[inline]
    pub fn is_none(self) -> bool {
        self == WidthClass::None
    }

    /// Largest value representable in this class.
    pub fn max_value(self) -> u64 {
        match self {
            WidthClass::None => 0,
            _ => (1u64 << (7 * self.width())) - 1,
        }
    }

    /// The marker bit as it appears in the first byte.
    #[inline]
    fn marker(self) -> u8 {
        match self {
            WidthClass::None => 0,
            _ => 0x80 >> (self.width() - 1),
        }
    }
}

/// Decodes a coded integer from the start of `buf`.
///
/// A first byte of `0x00` yields the sentinel `(WidthClass::None, 0)`.
///
/// # Panics
///
/// Panics if `buf` is empty or shorter than the width announced by its first
/// byte. Use [`try_decode`] for untrusted input.
pub fn decode(buf: &[u8]) -> (WidthClass, u64) {
    match try_decode(buf) {
        Ok(decoded) => decoded,
        Err(err) => panic!("coded integer decode: {err}"),
    }
}

/// Decodes a coded integer from the start of `buf`, reporting short input as
/// [`EbmlError::UnexpectedEof`] with offsets relative to `buf`.
pub fn try_decode(buf: &[u8]) -> Result<(WidthClass, u64), EbmlError> {
    let Some(&first) = buf.first() else {
        return Err(EbmlError::UnexpectedEof {
            offset: 0,
            needed: 1,
            available: 0,
        });
    };
    let class = WidthClass::from_marker(first);
    if class.is_none() {
        return Ok((WidthClass::None, 0));
    }
    let width = class.width();
    if buf.len() < width {
        return Err(EbmlError::UnexpectedEof {
            offset: 0,
            needed: width,
            available: buf.len(),
        });
    }
    Ok((class, value_of(class, &buf[..width])))
}

/// Strips the marker from `bytes` (exactly `class.width()` long) and returns
/// the big-endian value.
#[inline]
pub(crate) fn value_of(class: WidthClass, bytes: &[u8]) -> u64 {
    let head = u64::from(bytes[0] & (class.marker() - 1));
    bytes[1..]
        .iter()
        .fold(head, |acc, &b| (acc << 8) | u64::from(b))
}

/// Returns the narrowest class able to carry `n`.
///
/// Values above [`MAX_VALUE`] report [`WidthClass::H`]; [`encode`] rejects them.
pub fn class_for(n: u64) -> WidthClass {
    let mut width = 1;
    while width < MAX_WIDTH && n > WidthClass::from_width(width).max_value() {
        width += 1;
    }
    WidthClass::from_width(width)
}

/// Encodes `n` into the narrowest coded integer.
///
/// # Panics
///
/// Panics if `n` exceeds [`MAX_VALUE`].
pub fn encode(n: u64) -> (WidthClass, Vec<u8>) {
    let mut out = Vec::with_capacity(MAX_WIDTH);
    let class = encode_into(&mut out, n);
    (class, out)
}

/// Appends the narrowest coded integer for `n` to `out`.
///
/// # Panics
///
/// Panics if `n` exceeds [`MAX_VALUE`].
pub fn encode_into(out: &mut Vec<u8>, n: u64) -> WidthClass {
    assert!(n <= MAX_VALUE, "coded integer out of range: {n}");
    let class = class_for(n);
    let width = class.width();
    let start = out.len();
    out.extend_from_slice(&n.to_be_bytes()[MAX_WIDTH - width..]);
    out[start] |= class.marker();
    class
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_selects_class() {
        assert_eq!(WidthClass::from_marker(0x80), WidthClass::A);
        assert_eq!(WidthClass::from_marker(0xFF), WidthClass::A);
        assert_eq!(WidthClass::from_marker(0x40), WidthClass::B);
        assert_eq!(WidthClass::from_marker(0x1A), WidthClass::D);
        assert_eq!(WidthClass::from_marker(0x01), WidthClass::H);
        assert_eq!(WidthClass::from_marker(0x00), WidthClass::None);
    }

    #[test]
    fn sentinel_decodes_to_zero() {
        assert_eq!(decode(&[0x00, 0xFF, 0xFF]), (WidthClass::None, 0));
    }

    #[test]
    fn single_byte_values() {
        assert_eq!(decode(&[0xE4]), (WidthClass::A, 100));
        assert_eq!(decode(&[0x80]), (WidthClass::A, 0));
        assert_eq!(encode(100), (WidthClass::A, vec![0xE4]));
        assert_eq!(encode(127), (WidthClass::A, vec![0xFF]));
    }

    #[test]
    fn class_boundaries() {
        assert_eq!(encode(127).1, vec![0xFF]);
        assert_eq!(encode(128).1, vec![0x40, 0x80]);
        assert_eq!(encode(0x3FFF).1, vec![0x7F, 0xFF]);
        assert_eq!(encode(0x4000).1, vec![0x20, 0x40, 0x00]);
        assert_eq!(encode(MAX_VALUE).1, vec![0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(decode(&[0x40, 0x80]), (WidthClass::B, 128));
        assert_eq!(decode(&[0x7F, 0xFF]), (WidthClass::B, 0x3FFF));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        assert_eq!(decode(&[0x41, 0x00, 0xAA, 0xBB]), (WidthClass::B, 0x0100));
    }

    #[test]
    fn try_decode_reports_short_input() {
        assert_eq!(
            try_decode(&[]),
            Err(EbmlError::UnexpectedEof {
                offset: 0,
                needed: 1,
                available: 0
            })
        );
        assert_eq!(
            try_decode(&[0x20, 0x01]),
            Err(EbmlError::UnexpectedEof {
                offset: 0,
                needed: 3,
                available: 2
            })
        );
    }

    #[test]
    #[should_panic(expected = "coded integer decode")]
    fn decode_panics_on_short_input() {
        decode(&[0x10]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn encode_rejects_oversized_values() {
        encode(MAX_VALUE + 1);
    }

    #[test]
    fn encode_into_appends() {
        let mut out = vec![0xAA];
        assert_eq!(encode_into(&mut out, 0x0100), WidthClass::B);
        assert_eq!(out, vec![0xAA, 0x41, 0x00]);
    }

    #[test]
    fn max_value_per_class() {
        assert_eq!(WidthClass::None.max_value(), 0);
        assert_eq!(WidthClass::A.max_value(), 0x7F);
        assert_eq!(WidthClass::D.max_value(), 0x0FFF_FFFF);
        assert_eq!(WidthClass::H.max_value(), MAX_VALUE);
    }
}
