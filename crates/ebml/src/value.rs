//! Decoded value types.

/// Result of reading a float element.
///
/// The payload width decides the precision; an empty payload carries no
/// value at all.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Float {
    Single(f32),
    Double(f64),
    #[default]
    Absent,
}

impl Float {
    /// Widens the value to `f64`, or `None` when absent.
    pub fn to_f64(self) -> Option<f64> {
        match self {
            Float::Single(v) => Some(f64::from(v)),
            Float::Double(v) => Some(v),
            Float::Absent => None,
        }
    }

    pub fn is_absent(self) -> bool {
        matches!(self, Float::Absent)
    }
}

/// The `[id][size]` prefix of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHeader {
    /// Marker-stripped element identifier.
    pub id: u64,
    /// Declared payload length in bytes.
    pub size: u64,
    /// Absolute offset of the first identifier byte.
    pub offset: usize,
    /// Combined length of the encoded identifier and size.
    pub header_len: usize,
}

impl ElementHeader {
    /// Absolute offset of the first payload byte.
    pub fn data_offset(&self) -> usize {
        self.offset + self.header_len
    }

    /// Absolute offset one past the declared payload.
    pub fn end(&self) -> u64 {
        self.data_offset() as u64 + self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_widening() {
        assert_eq!(Float::Single(1.5).to_f64(), Some(1.5));
        assert_eq!(Float::Double(-2.25).to_f64(), Some(-2.25));
        assert_eq!(Float::Absent.to_f64(), None);
        assert!(Float::Absent.is_absent());
    }

    #[test]
    fn header_offsets() {
        let header = ElementHeader {
            id: 0x0A45_DFA3,
            size: 31,
            offset: 10,
            header_len: 5,
        };
        assert_eq!(header.data_offset(), 15);
        assert_eq!(header.end(), 46);
    }
}
