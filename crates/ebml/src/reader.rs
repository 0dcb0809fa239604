//! Element cursor over a borrowed buffer.
//!
//! A [`Reader`] walks `[id][size][payload]` elements front to back. Every
//! data-reading operation comes in two flavours:
//!
//! - `try_*` returns `Result<T, EbmlError>` and leaves the reader untouched on
//!   failure;
//! - the plain form latches the first error on the reader and yields a zero
//!   or empty value, so a scan can keep going and check [`Reader::failed`]
//!   once at the end.
//!
//! Both flavours are all-or-nothing: a failed read never moves the position.

use std::str;

use crate::options::ReaderOptions;
use crate::value::{ElementHeader, Float};
use crate::vint::{self, WidthClass};
use crate::EbmlError;

/// Cursor over an EBML byte buffer.
///
/// # Example
///
/// ```
/// use ebml::Reader;
///
/// // [id 0x02][size 3]["abc"]
/// let data = [0x82, 0x83, b'a', b'b', b'c'];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.read_element_id(), 0x02);
/// assert_eq!(reader.read_string(), "abc");
/// assert!(reader.at_end());
/// assert!(!reader.failed());
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    /// Absolute offset of `buf[0]` within the root buffer.
    start: usize,
    /// Local position. May exceed `buf.len()` after diving into an element
    /// whose declared size overruns the buffer.
    pos: usize,
    error: Option<EbmlError>,
    options: ReaderOptions,
}

impl<'a> Reader<'a> {
    /// Creates a root reader with default options.
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_options(buf, ReaderOptions::default())
    }

    /// Creates a root reader with the given options.
    ///
    /// # Panics
    ///
    /// Panics if either width in `options` lies outside `1..=8`.
    pub fn with_options(buf: &'a [u8], options: ReaderOptions) -> Self {
        options.validate();
        Self {
            buf,
            start: 0,
            pos: 0,
            error: None,
            options,
        }
    }

    /// The buffer this reader is bounded to.
    pub fn underlying(&self) -> &'a [u8] {
        self.buf
    }

    /// Absolute position, measured from the start of the root buffer.
    pub fn position(&self) -> usize {
        self.start.saturating_add(self.pos)
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Returns `true` once the position reaches the end of the buffer.
    pub fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Reports whether any read on this reader (or on its parent before the
    /// dive that produced it) has failed.
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// The first error latched on this reader.
    pub fn last_error(&self) -> Option<&EbmlError> {
        self.error.as_ref()
    }

    /// Options this reader (and every child it dives into) uses.
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    fn fail(&mut self, err: EbmlError) {
        if self.error.is_none() {
            log::debug!("ebml reader failed: {err}");
            self.error = Some(err);
        }
    }

    fn latch<T: Default>(&mut self, result: Result<T, EbmlError>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => {
                self.fail(err);
                T::default()
            }
        }
    }

    /// Runs `f`, restoring the position if it fails.
    fn transact<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, EbmlError>,
    ) -> Result<T, EbmlError> {
        let pos = self.pos;
        let result = f(self);
        if result.is_err() {
            self.pos = pos;
        }
        result
    }

    fn eof(&self, needed: usize) -> EbmlError {
        EbmlError::UnexpectedEof {
            offset: self.position(),
            needed,
            available: self.remaining(),
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], EbmlError> {
        if n > self.remaining() {
            return Err(self.eof(n));
        }
        let start = self.pos.min(self.buf.len());
        let bytes = &self.buf[start..start + n];
        self.pos += n;
        Ok(bytes)
    }

    fn take_sized(&mut self, size: u64) -> Result<&'a [u8], EbmlError> {
        self.take(usize::try_from(size).unwrap_or(usize::MAX))
    }

    /// Decodes the upcoming coded integer without consuming it.
    fn scan_vint(&self, max_width: usize) -> Result<(WidthClass, u64), EbmlError> {
        let Some(&first) = self.buf.get(self.pos) else {
            return Err(self.eof(1));
        };
        let class = WidthClass::from_marker(first);
        let width = class.width();
        if class.is_none() || width > max_width {
            return Err(EbmlError::MissingMarker {
                offset: self.position(),
                max_width,
            });
        }
        if width > self.remaining() {
            return Err(self.eof(width));
        }
        Ok((class, vint::value_of(class, &self.buf[self.pos..self.pos + width])))
    }

    fn read_vint(&mut self, max_width: usize) -> Result<u64, EbmlError> {
        let (class, value) = self.scan_vint(max_width)?;
        self.pos += class.width();
        Ok(value)
    }

    // -- bytes --------------------------------------------------------------

    /// Consumes one byte, or fails at the end of the buffer.
    pub fn try_read_byte(&mut self) -> Result<u8, EbmlError> {
        self.take(1).map(|b| b[0])
    }

    /// Consumes one byte. At the end of the buffer this latches
    /// [`EbmlError::UnexpectedEof`] and returns 0.
    pub fn read_byte(&mut self) -> u8 {
        let result = self.try_read_byte();
        self.latch(result)
    }

    // -- coded integers -----------------------------------------------------

    /// Reads an element identifier no wider than
    /// [`ReaderOptions::max_id_width`]. The marker bit is stripped.
    pub fn try_read_element_id(&mut self) -> Result<u64, EbmlError> {
        self.read_vint(self.options.max_id_width)
    }

    /// Latching form of [`Reader::try_read_element_id`]; yields 0 on failure.
    pub fn read_element_id(&mut self) -> u64 {
        let result = self.try_read_element_id();
        self.latch(result)
    }

    /// Reads an element payload size no wider than
    /// [`ReaderOptions::max_size_width`].
    pub fn try_read_element_size(&mut self) -> Result<u64, EbmlError> {
        self.read_vint(self.options.max_size_width)
    }

    /// Latching form of [`Reader::try_read_element_size`]; yields 0 on failure.
    pub fn read_element_size(&mut self) -> u64 {
        let result = self.try_read_element_size();
        self.latch(result)
    }

    /// Width class of the upcoming coded integer, without consuming it.
    ///
    /// Returns [`WidthClass::None`] at the end of the buffer or when the next
    /// byte carries no marker.
    pub fn peek_class(&self) -> WidthClass {
        self.buf
            .get(self.pos)
            .map_or(WidthClass::None, |&b| WidthClass::from_marker(b))
    }

    /// Decodes the upcoming identifier without moving or latching.
    pub fn try_peek_element_id(&self) -> Result<u64, EbmlError> {
        self.scan_vint(self.options.max_id_width).map(|(_, value)| value)
    }

    /// Reads the upcoming identifier without moving. A failure still latches.
    pub fn peek_element_id(&mut self) -> u64 {
        let result = self.try_peek_element_id();
        self.latch(result)
    }

    /// Decodes the upcoming size without moving or latching.
    pub fn try_peek_element_size(&self) -> Result<u64, EbmlError> {
        self.scan_vint(self.options.max_size_width).map(|(_, value)| value)
    }

    /// Reads the upcoming size without moving. A failure still latches.
    pub fn peek_element_size(&mut self) -> u64 {
        let result = self.try_peek_element_size();
        self.latch(result)
    }

    // -- headers ------------------------------------------------------------

    /// Reads an `[id][size]` pair.
    pub fn try_read_header(&mut self) -> Result<ElementHeader, EbmlError> {
        self.transact(|r| {
            let offset = r.position();
            let id = r.try_read_element_id()?;
            let size = r.try_read_element_size()?;
            Ok(ElementHeader {
                id,
                size,
                offset,
                header_len: r.position() - offset,
            })
        })
    }

    /// Reads an `[id][size]` pair, latching on failure. A failed read yields
    /// a header with zero id, size and length at the current offset.
    pub fn read_header(&mut self) -> ElementHeader {
        let offset = self.position();
        match self.try_read_header() {
            Ok(header) => header,
            Err(err) => {
                self.fail(err);
                ElementHeader {
                    id: 0,
                    size: 0,
                    offset,
                    header_len: 0,
                }
            }
        }
    }

    /// Reads the upcoming `[id][size]` pair without moving or latching.
    pub fn try_peek_header(&self) -> Result<ElementHeader, EbmlError> {
        let mut probe = self.clone();
        probe.try_read_header()
    }

    // -- integers -----------------------------------------------------------

    /// Reads exactly `width` bytes as a big-endian unsigned integer.
    ///
    /// # Panics
    ///
    /// Panics if `width` is outside `1..=8`.
    pub fn try_read_fixed_unsigned_int(&mut self, width: usize) -> Result<u64, EbmlError> {
        assert!((1..=8).contains(&width), "invalid integer width: {width}");
        let bytes = self.take(width)?;
        Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    /// Latching form of [`Reader::try_read_fixed_unsigned_int`].
    ///
    /// # Panics
    ///
    /// Panics if `width` is outside `1..=8`.
    pub fn read_fixed_unsigned_int(&mut self, width: usize) -> u64 {
        let result = self.try_read_fixed_unsigned_int(width);
        self.latch(result)
    }

    /// Reads exactly `width` bytes as a big-endian two's-complement integer,
    /// sign-extended from bit `8 * width - 1`.
    ///
    /// # Panics
    ///
    /// Panics if `width` is outside `1..=8`.
    pub fn try_read_fixed_signed_int(&mut self, width: usize) -> Result<i64, EbmlError> {
        let raw = self.try_read_fixed_unsigned_int(width)?;
        let shift = 64 - 8 * width as u32;
        Ok(((raw << shift) as i64) >> shift)
    }

    /// Latching form of [`Reader::try_read_fixed_signed_int`].
    ///
    /// # Panics
    ///
    /// Panics if `width` is outside `1..=8`.
    pub fn read_fixed_signed_int(&mut self, width: usize) -> i64 {
        let result = self.try_read_fixed_signed_int(width);
        self.latch(result)
    }

    /// Checks a size-prefixed integer payload. `None` means an empty payload.
    fn int_width(&self, size: u64) -> Result<Option<usize>, EbmlError> {
        match size {
            0 => Ok(None),
            1..=8 => Ok(Some(size as usize)),
            _ => Err(EbmlError::IntegerTooWide {
                offset: self.position(),
                size,
            }),
        }
    }

    /// Reads a size prefix followed by a big-endian unsigned payload. An
    /// empty payload reads as 0.
    pub fn try_read_unsigned_int(&mut self) -> Result<u64, EbmlError> {
        self.transact(|r| {
            let size = r.try_read_element_size()?;
            match r.int_width(size)? {
                Some(width) => r.try_read_fixed_unsigned_int(width),
                None => Ok(0),
            }
        })
    }

    /// Latching form of [`Reader::try_read_unsigned_int`]; yields 0 on failure.
    pub fn read_unsigned_int(&mut self) -> u64 {
        let result = self.try_read_unsigned_int();
        self.latch(result)
    }

    /// Reads a size prefix followed by a big-endian signed payload. An empty
    /// payload reads as 0.
    pub fn try_read_signed_int(&mut self) -> Result<i64, EbmlError> {
        self.transact(|r| {
            let size = r.try_read_element_size()?;
            match r.int_width(size)? {
                Some(width) => r.try_read_fixed_signed_int(width),
                None => Ok(0),
            }
        })
    }

    /// Latching form of [`Reader::try_read_signed_int`]; yields 0 on failure.
    pub fn read_signed_int(&mut self) -> i64 {
        let result = self.try_read_signed_int();
        self.latch(result)
    }

    // -- floats -------------------------------------------------------------

    /// Reads a size-prefixed IEEE-754 float.
    ///
    /// # Panics
    ///
    /// Panics if the declared size is not 0, 4 or 8.
    pub fn try_read_float(&mut self) -> Result<Float, EbmlError> {
        self.transact(|r| {
            let size = r.try_read_element_size()?;
            match size {
                0 => Ok(Float::Absent),
                4 => {
                    let bits = r.try_read_fixed_unsigned_int(4)? as u32;
                    Ok(Float::Single(f32::from_bits(bits)))
                }
                8 => {
                    let bits = r.try_read_fixed_unsigned_int(8)?;
                    Ok(Float::Double(f64::from_bits(bits)))
                }
                _ => panic!("invalid float size: {size}"),
            }
        })
    }

    /// Latching form of [`Reader::try_read_float`]. A truncated payload yields
    /// zero at the declared precision, so only [`Reader::failed`] tells it
    /// apart from a real zero. An unreadable size prefix yields
    /// [`Float::Absent`].
    ///
    /// # Panics
    ///
    /// Panics if the declared size is not 0, 4 or 8.
    pub fn read_float(&mut self) -> Float {
        let declared = self.try_peek_element_size().ok();
        match self.try_read_float() {
            Ok(value) => value,
            Err(err) => {
                self.fail(err);
                match declared {
                    Some(4) => Float::Single(0.0),
                    Some(8) => Float::Double(0.0),
                    _ => Float::Absent,
                }
            }
        }
    }

    // -- binary and strings -------------------------------------------------

    /// Reads a size prefix and returns a view of the payload.
    pub fn try_read_binary(&mut self) -> Result<&'a [u8], EbmlError> {
        self.transact(|r| {
            let size = r.try_read_element_size()?;
            r.take_sized(size)
        })
    }

    /// Latching form of [`Reader::try_read_binary`]; yields an empty slice on
    /// failure.
    pub fn read_binary(&mut self) -> &'a [u8] {
        let result = self.try_read_binary();
        self.latch(result)
    }

    /// Reads a size-prefixed payload with its trailing zero padding removed.
    pub fn try_read_bytes(&mut self) -> Result<&'a [u8], EbmlError> {
        self.try_read_binary().map(trim_padding)
    }

    /// Latching form of [`Reader::try_read_bytes`]; yields an empty slice on
    /// failure.
    pub fn read_bytes(&mut self) -> &'a [u8] {
        let result = self.try_read_bytes();
        self.latch(result)
    }

    /// Reads a size-prefixed, zero-padded UTF-8 string.
    pub fn try_read_string(&mut self) -> Result<&'a str, EbmlError> {
        self.transact(|r| {
            let size = r.try_read_element_size()?;
            let offset = r.position();
            let bytes = trim_padding(r.take_sized(size)?);
            str::from_utf8(bytes).map_err(|_| EbmlError::InvalidUtf8 { offset })
        })
    }

    /// Latching form of [`Reader::try_read_string`]; yields `""` on failure.
    pub fn read_string(&mut self) -> &'a str {
        let result = self.try_read_string();
        self.latch(result)
    }

    // -- navigation ---------------------------------------------------------

    /// Reads a size prefix and steps over the payload.
    pub fn try_skip_element(&mut self) -> Result<(), EbmlError> {
        self.transact(|r| {
            let offset = r.position();
            let size = r.try_read_element_size()?;
            r.take_sized(size)?;
            log::trace!("skipped {size} byte payload at offset {offset}");
            Ok(())
        })
    }

    /// Latching form of [`Reader::try_skip_element`]; consumes nothing on
    /// failure.
    pub fn skip_element(&mut self) {
        let result = self.try_skip_element();
        self.latch(result)
    }

    /// Reads a size prefix and returns a reader over the payload.
    ///
    /// The child is clamped to the bytes actually available, while this
    /// reader advances by the declared size. A size that overruns the buffer
    /// therefore leaves [`Reader::position`] past the end of the buffer
    /// instead of silently truncating the element.
    pub fn try_dive(&mut self) -> Result<Reader<'a>, EbmlError> {
        let size = self.try_read_element_size()?;
        Ok(self.dive_sized(size))
    }

    /// Latching form of [`Reader::try_dive`]. When the size prefix cannot be
    /// read the child is empty and carries the latched error.
    pub fn dive(&mut self) -> Reader<'a> {
        match self.try_dive() {
            Ok(child) => child,
            Err(err) => {
                self.fail(err);
                self.child(self.pos, 0)
            }
        }
    }

    fn dive_sized(&mut self, size: u64) -> Reader<'a> {
        let declared = usize::try_from(size).unwrap_or(usize::MAX);
        let available = self.remaining();
        let len = declared.min(available);
        if len < declared {
            log::debug!(
                "element at offset {} declares {size} bytes, {available} available",
                self.position()
            );
        }
        log::trace!("dive into {len} bytes at offset {}", self.position());
        let child = self.child(self.pos, len);
        self.pos = self.pos.saturating_add(declared);
        child
    }

    /// A reader over `buf[from..from + len]` that inherits this reader's
    /// options and current error.
    fn child(&self, from: usize, len: usize) -> Reader<'a> {
        let from = from.min(self.buf.len());
        Reader {
            buf: &self.buf[from..from + len],
            start: self.start.saturating_add(from),
            pos: 0,
            error: self.error.clone(),
            options: self.options,
        }
    }

    /// Iterates over the elements remaining in this reader.
    ///
    /// Each item carries the element header and a dived reader over its
    /// payload. Iteration stops at the end of the buffer or as soon as this
    /// reader has failed.
    pub fn elements(&mut self) -> Elements<'_, 'a> {
        Elements { reader: self }
    }
}

/// Strips trailing zero bytes. An all-zero payload becomes empty.
fn trim_padding(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}

/// An element produced by [`Reader::elements`].
#[derive(Debug, Clone)]
pub struct Element<'a> {
    pub header: ElementHeader,
    /// Reader bounded to the element payload.
    pub reader: Reader<'a>,
}

/// Iterator returned by [`Reader::elements`].
pub struct Elements<'r, 'a> {
    reader: &'r mut Reader<'a>,
}

impl<'a> Iterator for Elements<'_, 'a> {
    type Item = Element<'a>;

    fn next(&mut self) -> Option<Element<'a>> {
        if self.reader.at_end() || self.reader.failed() {
            return None;
        }
        let header = self.reader.read_header();
        if self.reader.failed() {
            return None;
        }
        let reader = self.reader.dive_sized(header.size);
        Some(Element { header, reader })
    }
}
