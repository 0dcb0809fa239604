//! Element framing writer.

use crate::vint;

/// Builds `[id][size][payload]` element sequences.
///
/// Identifiers are taken in the same marker-stripped form that
/// [`Reader::read_element_id`](crate::Reader::read_element_id) returns, and
/// are written in their narrowest encoding.
///
/// ```
/// use ebml::{ElementWriter, Reader};
///
/// let mut writer = ElementWriter::new();
/// writer.master(0x0A45_DFA3, |w| {
///     w.unsigned(0x0286, 1);
///     w.string(0x0282, "webm");
/// });
/// let data = writer.flush();
///
/// let mut reader = Reader::new(&data);
/// assert_eq!(reader.read_element_id(), 0x0A45_DFA3);
/// let mut header = reader.dive();
/// assert_eq!(header.read_element_id(), 0x0286);
/// assert_eq!(header.read_unsigned_int(), 1);
/// assert_eq!(header.read_element_id(), 0x0282);
/// assert_eq!(header.read_string(), "webm");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ElementWriter {
    buf: Vec<u8>,
}

impl ElementWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards everything written so far.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Returns the bytes written so far and resets the writer.
    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a coded element identifier.
    pub fn id(&mut self, id: u64) {
        vint::encode_into(&mut self.buf, id);
    }

    /// Writes a coded payload size.
    pub fn size(&mut self, size: u64) {
        vint::encode_into(&mut self.buf, size);
    }

    /// Writes raw bytes with no framing.
    pub fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes an unsigned integer element using the fewest payload bytes
    /// (at least one).
    pub fn unsigned(&mut self, id: u64, value: u64) {
        let width = (8 - value.leading_zeros() as usize / 8).max(1);
        self.binary(id, &value.to_be_bytes()[8 - width..]);
    }

    /// Writes a two's-complement integer element using the fewest payload
    /// bytes that preserve the sign.
    pub fn signed(&mut self, id: u64, value: i64) {
        let width = (1..=8)
            .find(|&w| {
                let shift = 64 - 8 * w as u32;
                (value << shift) >> shift == value
            })
            .unwrap_or(8);
        self.binary(id, &value.to_be_bytes()[8 - width..]);
    }

    /// Writes a single-precision float element (4 byte payload).
    pub fn float32(&mut self, id: u64, value: f32) {
        self.binary(id, &value.to_be_bytes());
    }

    /// Writes a double-precision float element (8 byte payload).
    pub fn float64(&mut self, id: u64, value: f64) {
        self.binary(id, &value.to_be_bytes());
    }

    /// Writes a string element with no padding.
    pub fn string(&mut self, id: u64, value: &str) {
        self.binary(id, value.as_bytes());
    }

    /// Writes a string element right-padded with zero bytes to `width`.
    ///
    /// # Panics
    ///
    /// Panics if `value` is longer than `width`.
    pub fn string_padded(&mut self, id: u64, value: &str, width: usize) {
        assert!(
            value.len() <= width,
            "string of {} bytes does not fit in {width}",
            value.len()
        );
        self.id(id);
        self.size(width as u64);
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.resize(self.buf.len() + width - value.len(), 0);
    }

    /// Writes an element with `payload` as its raw content.
    pub fn binary(&mut self, id: u64, payload: &[u8]) {
        self.id(id);
        self.size(payload.len() as u64);
        self.buf.extend_from_slice(payload);
    }

    /// Writes a master element whose payload is produced by `children`.
    pub fn master(&mut self, id: u64, children: impl FnOnce(&mut ElementWriter)) {
        let mut inner = ElementWriter::new();
        children(&mut inner);
        self.binary(id, &inner.buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Float, Reader};

    #[test]
    fn unsigned_uses_minimal_width() {
        let mut writer = ElementWriter::new();
        writer.unsigned(0x01, 0);
        assert_eq!(writer.flush(), vec![0x81, 0x81, 0x00]);
        writer.unsigned(0x01, 0x0100);
        assert_eq!(writer.flush(), vec![0x81, 0x82, 0x01, 0x00]);
        writer.unsigned(0x01, u64::MAX);
        assert_eq!(writer.flush().len(), 2 + 8);
    }

    #[test]
    fn signed_preserves_sign() {
        let mut writer = ElementWriter::new();
        writer.signed(0x01, -1);
        assert_eq!(writer.flush(), vec![0x81, 0x81, 0xFF]);
        writer.signed(0x01, 128);
        assert_eq!(writer.flush(), vec![0x81, 0x82, 0x00, 0x80]);
        writer.signed(0x01, -129);
        assert_eq!(writer.flush(), vec![0x81, 0x82, 0xFF, 0x7F]);
        writer.signed(0x01, i64::MIN);
        assert_eq!(writer.flush().len(), 2 + 8);
    }

    #[test]
    fn padded_string() {
        let mut writer = ElementWriter::new();
        writer.string_padded(0x02, "ab", 4);
        assert_eq!(writer.flush(), vec![0x82, 0x84, b'a', b'b', 0, 0]);
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn padded_string_too_long() {
        ElementWriter::new().string_padded(0x02, "abcdef", 4);
    }

    #[test]
    fn master_sizes_children() {
        let mut writer = ElementWriter::new();
        writer.master(0x10, |w| {
            w.binary(0x11, &[0xAA; 200]);
        });
        let data = writer.flush();
        // id, 2 byte size (203), child id, 2 byte size (200), payload
        assert_eq!(&data[..3], &[0x90, 0x40, 0xCB]);
        assert_eq!(&data[3..6], &[0x91, 0x40, 0xC8]);
        assert_eq!(data.len(), 3 + 203);
    }

    #[test]
    fn float32_reads_back_as_single() {
        let mut writer = ElementWriter::new();
        writer.float32(0x08, 1.0);
        let data = writer.flush();
        assert_eq!(data, vec![0x88, 0x84, 0x3F, 0x80, 0x00, 0x00]);

        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_element_id(), 0x08);
        assert_eq!(reader.read_float(), Float::Single(1.0));
        assert!(!reader.failed());
    }

    #[test]
    fn reset_discards_pending_bytes() {
        let mut writer = ElementWriter::new();
        writer.unsigned(0x01, 5);
        writer.reset();
        assert!(writer.is_empty());
        writer.unsigned(0x02, 6);
        assert_eq!(writer.flush(), vec![0x82, 0x81, 0x06]);
    }

    #[test]
    fn flush_resets() {
        let mut writer = ElementWriter::new();
        writer.raw(&[1, 2, 3]);
        assert_eq!(writer.len(), 3);
        assert_eq!(writer.flush(), vec![1, 2, 3]);
        assert!(writer.is_empty());
    }
}
