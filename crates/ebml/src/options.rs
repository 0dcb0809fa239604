//! Reader configuration.

use crate::vint::MAX_WIDTH;

/// Options for [`Reader`](crate::Reader).
///
/// The defaults follow the EBML header defaults: identifiers are at most 4
/// bytes wide and sizes at most 8 bytes wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Widest coded integer accepted by `read_element_id`, in bytes.
    pub max_id_width: usize,
    /// Widest coded integer accepted by `read_element_size`, in bytes.
    pub max_size_width: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            max_id_width: 4,
            max_size_width: MAX_WIDTH,
        }
    }
}

impl ReaderOptions {
    /// Checks that both widths lie in `1..=8`.
    ///
    /// # Panics
    ///
    /// Panics on an out-of-range width.
    pub(crate) fn validate(&self) {
        assert!(
            (1..=MAX_WIDTH).contains(&self.max_id_width),
            "invalid max_id_width: {}",
            self.max_id_width
        );
        assert!(
            (1..=MAX_WIDTH).contains(&self.max_size_width),
            "invalid max_size_width: {}",
            self.max_size_width
        );
    }
}
