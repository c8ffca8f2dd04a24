//! Byte order handling for MAT containers.
//!
//! Level 5 files record their byte order in the header's endian indicator;
//! Level 4 files encode it in the first digit of each variable's type code.
//! Reading honours either order. Writing is always little-endian.

use crate::data_type::DataType;
use crate::error::{Error, Result};

/// Byte order of a MAT container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Least significant byte first (`IM` indicator).
    Little,
    /// Most significant byte first (`MI` indicator).
    Big,
}

impl Endian {
    /// Byte order of the host.
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    /// Decode a u16 from the first two bytes of `bytes`.
    pub(crate) fn u16(self, bytes: &[u8]) -> u16 {
        u16::from_bytes(bytes, self)
    }

    /// Decode a u32 from the first four bytes of `bytes`.
    pub(crate) fn u32(self, bytes: &[u8]) -> u32 {
        u32::from_bytes(bytes, self)
    }

    /// Decode an i32 from the first four bytes of `bytes`.
    pub(crate) fn i32(self, bytes: &[u8]) -> i32 {
        i32::from_bytes(bytes, self)
    }
}

/// Fixed-size primitive that can be read in either byte order and written
/// little-endian.
pub(crate) trait Primitive: Copy {
    /// Encoded width in bytes.
    const SIZE: usize;

    /// Decode from the first `SIZE` bytes of `bytes`.
    fn from_bytes(bytes: &[u8], endian: Endian) -> Self;

    /// Append the little-endian encoding to `out`.
    fn write_le(self, out: &mut Vec<u8>);
}

macro_rules! impl_primitive {
    ($($t:ty),* $(,)?) => {
        $(
            impl Primitive for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                fn from_bytes(bytes: &[u8], endian: Endian) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(&bytes[..Self::SIZE]);
                    match endian {
                        Endian::Little => <$t>::from_le_bytes(buf),
                        Endian::Big => <$t>::from_be_bytes(buf),
                    }
                }

                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_primitive!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

/// Decode a packed array of `T` values.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] if the byte count is not a multiple of
/// the element width.
pub(crate) fn read_values<T: Primitive>(bytes: &[u8], endian: Endian) -> Result<Vec<T>> {
    if bytes.len() % T::SIZE != 0 {
        return Err(Error::invalid_format(format!(
            "{} bytes is not a whole number of {}-byte values",
            bytes.len(),
            T::SIZE
        )));
    }

    Ok(bytes
        .chunks_exact(T::SIZE)
        .map(|chunk| T::from_bytes(chunk, endian))
        .collect())
}

/// Target element type for widening or narrowing stored values.
///
/// MAT writers may store an array in a smaller type than its class
/// (a double array of small integers stored as miUINT8, for example).
/// Conversions follow Rust `as` semantics.
pub(crate) trait Element: Primitive {
    fn from_i64(value: i64) -> Self;
    fn from_u64(value: u64) -> Self;
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_element {
    ($($t:ty),* $(,)?) => {
        $(
            impl Element for $t {
                fn from_i64(value: i64) -> Self {
                    value as $t
                }

                fn from_u64(value: u64) -> Self {
                    value as $t
                }

                fn from_f64(value: f64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_element!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

/// Decode numeric data stored as `stored` into values of type `T`.
pub(crate) fn decode_as<T: Element>(stored: DataType, bytes: &[u8], endian: Endian) -> Result<Vec<T>> {
    fn widen<S, T>(bytes: &[u8], endian: Endian, f: impl Fn(S) -> T) -> Result<Vec<T>>
    where
        S: Primitive,
    {
        Ok(read_values::<S>(bytes, endian)?.into_iter().map(f).collect())
    }

    match stored {
        DataType::Int8 => widen(bytes, endian, |v: i8| T::from_i64(v as i64)),
        DataType::UInt8 => widen(bytes, endian, |v: u8| T::from_i64(v as i64)),
        DataType::Int16 => widen(bytes, endian, |v: i16| T::from_i64(v as i64)),
        DataType::UInt16 => widen(bytes, endian, |v: u16| T::from_i64(v as i64)),
        DataType::Int32 => widen(bytes, endian, |v: i32| T::from_i64(v as i64)),
        DataType::UInt32 => widen(bytes, endian, |v: u32| T::from_i64(v as i64)),
        DataType::Int64 => widen(bytes, endian, T::from_i64),
        DataType::UInt64 => widen(bytes, endian, T::from_u64),
        DataType::Single => widen(bytes, endian, |v: f32| T::from_f64(v as f64)),
        DataType::Double => widen(bytes, endian, T::from_f64),
        other => Err(Error::invalid_format(format!(
            "{} cannot hold numeric data",
            other
        ))),
    }
}
