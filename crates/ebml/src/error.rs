//! Data errors raised while reading EBML input.

use thiserror::Error;

/// Error type for malformed or truncated EBML input.
///
/// Offsets are absolute: they are measured from the start of the root buffer
/// even when the error was raised inside a dived child cursor.
///
/// Caller misuse (an invalid fixed width, an invalid float size, an
/// out-of-range value passed to the encoder) is not represented here; those
/// paths panic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EbmlError {
    #[error("unexpected end of input at offset {offset}: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("no width marker within {max_width} bytes at offset {offset}")]
    MissingMarker { offset: usize, max_width: usize },
    #[error("integer payload of {size} bytes at offset {offset} exceeds 8 bytes")]
    IntegerTooWide { offset: usize, size: u64 },
    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },
}

impl EbmlError {
    /// Absolute offset at which the error was detected.
    pub fn offset(&self) -> usize {
        match *self {
            EbmlError::UnexpectedEof { offset, .. }
            | EbmlError::MissingMarker { offset, .. }
            | EbmlError::IntegerTooWide { offset, .. }
            | EbmlError::InvalidUtf8 { offset } => offset,
        }
    }

    /// Returns `true` for errors caused by running out of input.
    pub fn is_eof(&self) -> bool {
        matches!(self, EbmlError::UnexpectedEof { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offset() {
        let err = EbmlError::UnexpectedEof {
            offset: 12,
            needed: 4,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "unexpected end of input at offset 12: needed 4 bytes, 1 available"
        );
        assert_eq!(err.offset(), 12);
        assert!(err.is_eof());
    }

    #[test]
    fn missing_marker_is_not_eof() {
        let err = EbmlError::MissingMarker {
            offset: 3,
            max_width: 4,
        };
        assert_eq!(err.offset(), 3);
        assert!(!err.is_eof());
        assert_eq!(err.to_string(), "no width marker within 4 bytes at offset 3");
    }
}
