//! EBML coded-integer codec and element cursor.
//!
//! EBML (the framing layer of Matroska and WebM) stores everything as
//! `[id][size][payload]` elements, where the identifier and the size are
//! variable-length "coded integers" and a payload may itself hold further
//! elements.
//!
//! # Overview
//!
//! - [`vint`] - encode and decode coded integers
//! - [`Reader`] - forward-only cursor over a borrowed buffer, with typed reads
//!   and [`Reader::dive`] into nested elements
//! - [`ElementWriter`] - builds framed element sequences
//! - [`EbmlError`] - truncated or malformed input
//!
//! # Example
//!
//! ```
//! use ebml::{ElementWriter, Float, Reader};
//!
//! let mut writer = ElementWriter::new();
//! writer.master(0x0549_A966, |info| {
//!     info.unsigned(0x0AD7B1, 1_000_000);
//!     info.float64(0x0489, 1500.0);
//! });
//! let data = writer.flush();
//!
//! let mut reader = Reader::new(&data);
//! for mut element in reader.elements() {
//!     assert_eq!(element.header.id, 0x0549_A966);
//!     let info = &mut element.reader;
//!     assert_eq!(info.read_element_id(), 0x0AD7B1);
//!     assert_eq!(info.read_unsigned_int(), 1_000_000);
//!     assert_eq!(info.read_element_id(), 0x0489);
//!     assert_eq!(info.read_float(), Float::Double(1500.0));
//! }
//! assert!(!reader.failed());
//! ```
//!
//! # Failure handling
//!
//! Truncated or malformed input is a data error: the plain read methods
//! latch the first [`EbmlError`] on the reader and return a zero or empty
//! value, while the `try_*` methods return it directly. Misuse by the caller
//! (an integer width outside `1..=8`, a float size other than 0, 4 or 8)
//! panics.

mod error;
mod options;
mod reader;
mod value;
pub mod vint;
mod writer;

pub use error::EbmlError;
pub use options::ReaderOptions;
pub use reader::{Element, Elements, Reader};
pub use value::{ElementHeader, Float};
pub use vint::WidthClass;
pub use writer::ElementWriter;
