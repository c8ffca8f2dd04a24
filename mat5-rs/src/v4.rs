//! Level 4 (MATLAB 4) container support.
//!
//! Level 4 files have no file header. Each variable starts with five
//! 32-bit integers:
//!
//! ```text
//! MOPT  type code M*1000 + O*100 + P*10 + T
//! mrows number of rows
//! ncols number of columns
//! imagf 1 if an imaginary part follows the real part
//! namlen name length including the terminating NUL
//! ```
//!
//! followed by the name and column-major data. `M` is the byte order
//! (0 little-endian, 1 big-endian IEEE), `P` the stored precision and `T`
//! the matrix kind (0 full numeric, 1 text, 2 sparse).
//!
//! Level 4 numeric data always loads as `double`, which is what MATLAB does.

use crate::data_type::DataType;
use crate::endian::{decode_as, Endian};
use crate::error::{Error, Result};
use crate::numeric::{NumericArray, NumericData};
use crate::variable::{Value, Variable};

/// Size of a Level 4 matrix header.
pub(crate) const V4_HEADER_LEN: usize = 20;

/// Longest name accepted when sniffing a header.
const MAX_NAME_LEN: i32 = 4096;

/// A parsed Level 4 matrix header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct V4Header {
    pub endian: Endian,
    pub precision: DataType,
    pub kind: i32,
    pub rows: usize,
    pub cols: usize,
    pub complex: bool,
    pub name_len: usize,
}

impl V4Header {
    /// Parse and sanity-check a 20-byte header, trying both byte orders.
    ///
    /// Returns `None` if the bytes are not a plausible Level 4 header.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < V4_HEADER_LEN {
            return None;
        }

        [Endian::Little, Endian::Big]
            .into_iter()
            .find_map(|endian| Self::parse_as(bytes, endian))
    }

    fn parse_as(bytes: &[u8], endian: Endian) -> Option<Self> {
        let mopt = endian.i32(&bytes[0..4]);
        if !(0..=1052).contains(&mopt) {
            return None;
        }

        let m = mopt / 1000;
        let o = (mopt % 1000) / 100;
        let p = (mopt % 100) / 10;
        let t = mopt % 10;

        let expected_m = match endian {
            Endian::Little => 0,
            Endian::Big => 1,
        };
        if m != expected_m || o != 0 || t > 2 {
            return None;
        }

        let precision = match p {
            0 => DataType::Double,
            1 => DataType::Single,
            2 => DataType::Int32,
            3 => DataType::Int16,
            4 => DataType::UInt16,
            5 => DataType::UInt8,
            _ => return None,
        };

        let rows = endian.i32(&bytes[4..8]);
        let cols = endian.i32(&bytes[8..12]);
        let imagf = endian.i32(&bytes[12..16]);
        let name_len = endian.i32(&bytes[16..20]);

        if rows < 0 || cols < 0 || !(imagf == 0 || imagf == 1) {
            return None;
        }
        if !(1..=MAX_NAME_LEN).contains(&name_len) {
            return None;
        }

        Some(V4Header {
            endian,
            precision,
            kind: t,
            rows: rows as usize,
            cols: cols as usize,
            complex: imagf == 1,
            name_len: name_len as usize,
        })
    }

    /// Bytes of data (one part) following the name.
    fn part_len(&self) -> Option<usize> {
        self.rows
            .checked_mul(self.cols)?
            .checked_mul(self.precision.size_bytes())
    }

    /// Bytes following the header: name plus real and imaginary data.
    pub fn payload_len(&self) -> Option<usize> {
        let parts = if self.complex { 2 } else { 1 };
        self.part_len()?
            .checked_mul(parts)?
            .checked_add(self.name_len)
    }
}

/// Decode a Level 4 variable from its header and payload.
pub(crate) fn decode_v4(header: &V4Header, payload: &[u8]) -> Result<Variable> {
    let name_bytes = &payload[..header.name_len.min(payload.len())];
    let end = name_bytes
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(name_bytes.len());
    let name = String::from_utf8_lossy(&name_bytes[..end]).into_owned();

    let part_len = header
        .part_len()
        .ok_or_else(|| Error::invalid_format(format!("'{}': Level 4 matrix too large", name)))?;
    let data = payload.get(header.name_len..).ok_or(Error::UnexpectedEof)?;
    if data.len() < part_len {
        return Err(Error::UnexpectedEof);
    }

    let dims = vec![header.rows, header.cols];
    let real: Vec<f64> = decode_as(header.precision, &data[..part_len], header.endian)?;

    let value = match header.kind {
        0 => {
            let imag = if header.complex {
                let imag_bytes = data.get(part_len..2 * part_len).ok_or(Error::UnexpectedEof)?;
                Some(NumericData::Double(decode_as(
                    header.precision,
                    imag_bytes,
                    header.endian,
                )?))
            } else {
                None
            };
            Value::Numeric(NumericArray {
                real: NumericData::Double(real),
                imag,
            })
        }
        1 => Value::Char(real.into_iter().map(|c| c as u16).collect()),
        _ => {
            return Err(Error::invalid_format(format!(
                "'{}': Level 4 sparse matrices are not supported",
                name
            )))
        }
    };

    Ok(Variable::new(name, dims, value))
}
