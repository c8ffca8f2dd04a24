//! Data element tags: parsing sub-elements out of a buffer and encoding
//! them back.
//!
//! A tag is normally eight bytes, `u32 type` then `u32 byte count`, followed
//! by the data padded to a multiple of eight. When the upper 16 bits of the
//! first word are non-zero the element uses the small form: the first word
//! packs `(count << 16) | type` and up to four data bytes follow in the
//! second word.

use crate::data_type::DataType;
use crate::endian::Endian;
use crate::error::{Error, Result};

/// Size of a full data element tag.
pub(crate) const TAG_LEN: usize = 8;

/// Round `n` up to the next multiple of eight.
pub(crate) const fn padded_len(n: usize) -> usize {
    (n + 7) & !7
}

/// A data element borrowed from a parent buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawElement<'a> {
    /// Type field as stored.
    pub raw_type: u32,
    /// Element data without padding.
    pub data: &'a [u8],
}

impl<'a> RawElement<'a> {
    /// The element's data type.
    pub fn data_type(&self) -> Result<DataType> {
        DataType::from_raw(self.raw_type).ok_or_else(|| {
            Error::invalid_format(format!("unknown data type {}", self.raw_type))
        })
    }
}

/// Decode the type and byte count from the first tag word pair.
///
/// Returns `(type, count, small)`.
pub(crate) fn parse_tag(tag: &[u8], endian: Endian) -> (u32, u32, bool) {
    let first = endian.u32(&tag[..4]);
    if first >> 16 != 0 {
        (first & 0xFFFF, first >> 16, true)
    } else {
        (first, endian.u32(&tag[4..8]), false)
    }
}

/// Sequential reader over the sub-elements of a miMATRIX body.
pub(crate) struct Elements<'a> {
    bytes: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> Elements<'a> {
    pub fn new(bytes: &'a [u8], endian: Endian) -> Self {
        Elements {
            bytes,
            pos: 0,
            endian,
        }
    }

    /// Check if every sub-element has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos.min(self.bytes.len())..]
    }

    /// Read the next sub-element, or `None` at the end of the buffer.
    pub fn next_element(&mut self) -> Result<Option<RawElement<'a>>> {
        if self.is_empty() {
            return Ok(None);
        }

        let rest = self.remaining();
        if rest.len() < TAG_LEN {
            return Err(Error::invalid_format(format!(
                "{} trailing bytes are too short for a tag",
                rest.len()
            )));
        }

        let (raw_type, count, small) = parse_tag(rest, self.endian);
        let count = count as usize;

        if small {
            if count > 4 {
                return Err(Error::invalid_format(format!(
                    "small data element claims {} bytes",
                    count
                )));
            }
            self.pos += TAG_LEN;
            return Ok(Some(RawElement {
                raw_type,
                data: &rest[4..4 + count],
            }));
        }

        let end = TAG_LEN
            .checked_add(count)
            .filter(|&end| end <= rest.len())
            .ok_or_else(|| {
                Error::invalid_format(format!(
                    "element of {} bytes overruns its parent ({} bytes left)",
                    count,
                    rest.len() - TAG_LEN
                ))
            })?;

        // The last element of a buffer is sometimes written without padding.
        self.pos += padded_len(end).min(rest.len());

        Ok(Some(RawElement {
            raw_type,
            data: &rest[TAG_LEN..end],
        }))
    }

    /// Read the next sub-element, failing if the buffer is exhausted.
    pub fn expect(&mut self, what: &str) -> Result<RawElement<'a>> {
        self.next_element()?
            .ok_or_else(|| Error::invalid_format(format!("missing {}", what)))
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Append a full-form element: tag, data, zero padding.
pub(crate) fn write_element(out: &mut Vec<u8>, data_type: DataType, data: &[u8]) {
    write_tag(out, data_type, data.len());
    out.extend_from_slice(data);
    pad(out, data.len());
}

/// Append an element, using the small form when the data fits in four
/// bytes.
pub(crate) fn write_compact_element(out: &mut Vec<u8>, data_type: DataType, data: &[u8]) {
    if data.is_empty() || data.len() > 4 {
        write_element(out, data_type, data);
        return;
    }

    let first = ((data.len() as u32) << 16) | data_type.to_raw();
    out.extend_from_slice(&first.to_le_bytes());
    let mut word = [0u8; 4];
    word[..data.len()].copy_from_slice(data);
    out.extend_from_slice(&word);
}

/// Append a full-form tag. Lengths above `u32::MAX` are truncated here and
/// must be rejected by the caller before the bytes are used.
pub(crate) fn write_tag(out: &mut Vec<u8>, data_type: DataType, len: usize) {
    out.extend_from_slice(&data_type.to_raw().to_le_bytes());
    out.extend_from_slice(&(len as u32).to_le_bytes());
}

/// Zero-pad after `len` data bytes to the next eight-byte boundary.
pub(crate) fn pad(out: &mut Vec<u8>, len: usize) {
    out.resize(out.len() + padded_len(len) - len, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_len() {
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(1), 8);
        assert_eq!(padded_len(8), 8);
        assert_eq!(padded_len(9), 16);
    }

    #[test]
    fn test_full_element_roundtrip() {
        let mut out = Vec::new();
        write_element(&mut out, DataType::Int8, b"hello");
        assert_eq!(out.len(), 16);

        let mut elements = Elements::new(&out, Endian::Little);
        let el = elements.expect("name").unwrap();
        assert_eq!(el.data_type().unwrap(), DataType::Int8);
        assert_eq!(el.data, b"hello");
        assert!(elements.is_empty());
    }

    #[test]
    fn test_small_element_roundtrip() {
        let mut out = Vec::new();
        write_compact_element(&mut out, DataType::Int8, b"ab");
        write_compact_element(&mut out, DataType::Int32, &7i32.to_le_bytes());
        assert_eq!(out.len(), 16);

        let mut elements = Elements::new(&out, Endian::Little);
        let name = elements.expect("name").unwrap();
        assert_eq!(name.data, b"ab");
        let width = elements.expect("width").unwrap();
        assert_eq!(width.data_type().unwrap(), DataType::Int32);
        assert_eq!(Endian::Little.i32(width.data), 7);
        assert!(elements.next_element().unwrap().is_none());
    }

    #[test]
    fn test_small_element_big_endian() {
        // count 2, type miINT8, data "xy"
        let bytes = [0x00, 0x02, 0x00, 0x01, b'x', b'y', 0, 0];
        let mut elements = Elements::new(&bytes, Endian::Big);
        let el = elements.expect("name").unwrap();
        assert_eq!(el.raw_type, 1);
        assert_eq!(el.data, b"xy");
    }

    #[test]
    fn test_empty_compact_element_uses_full_form() {
        let mut out = Vec::new();
        write_compact_element(&mut out, DataType::Int8, b"");
        assert_eq!(out, vec![1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_overrun_rejected() {
        let mut out = Vec::new();
        write_tag(&mut out, DataType::Double, 64);
        out.extend_from_slice(&[0; 8]);
        let mut elements = Elements::new(&out, Endian::Little);
        assert!(elements.next_element().is_err());
    }

    #[test]
    fn test_unpadded_tail_accepted() {
        let mut out = Vec::new();
        write_tag(&mut out, DataType::UInt8, 3);
        out.extend_from_slice(&[1, 2, 3]);
        let mut elements = Elements::new(&out, Endian::Little);
        assert_eq!(elements.expect("data").unwrap().data, &[1, 2, 3]);
        assert!(elements.is_empty());
    }
}
