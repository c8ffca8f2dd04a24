//! Typed numeric array storage.
//!
//! [`NumericData`] holds the elements of one numeric array (or one half of a
//! complex array) in the Rust type matching its MATLAB class. Values are in
//! column-major order, as MATLAB stores them.

use crate::class::ArrayClass;
use crate::data_type::DataType;
use crate::endian::{decode_as, Endian, Primitive};
use crate::error::{Error, Result};

/// Elements of a numeric array, tagged by class.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericData {
    /// `double`
    Double(Vec<f64>),
    /// `single`
    Single(Vec<f32>),
    /// `int8`
    Int8(Vec<i8>),
    /// `uint8` (also backs `logical` arrays)
    UInt8(Vec<u8>),
    /// `int16`
    Int16(Vec<i16>),
    /// `uint16`
    UInt16(Vec<u16>),
    /// `int32`
    Int32(Vec<i32>),
    /// `uint32`
    UInt32(Vec<u32>),
    /// `int64`
    Int64(Vec<i64>),
    /// `uint64`
    UInt64(Vec<u64>),
}

/// Apply the same expression to whichever vector a `NumericData` holds.
macro_rules! each_variant {
    ($value:expr, $v:ident => $body:expr) => {
        match $value {
            NumericData::Double($v) => $body,
            NumericData::Single($v) => $body,
            NumericData::Int8($v) => $body,
            NumericData::UInt8($v) => $body,
            NumericData::Int16($v) => $body,
            NumericData::UInt16($v) => $body,
            NumericData::Int32($v) => $body,
            NumericData::UInt32($v) => $body,
            NumericData::Int64($v) => $body,
            NumericData::UInt64($v) => $body,
        }
    };
}

impl NumericData {
    /// Decode an element's bytes into data of the given class.
    ///
    /// `stored` is the element's data type, which may be narrower than the
    /// class; values are converted to the class's element type.
    pub(crate) fn decode(
        class: ArrayClass,
        stored: DataType,
        bytes: &[u8],
        endian: Endian,
    ) -> Result<Self> {
        Ok(match class {
            ArrayClass::Double => NumericData::Double(decode_as(stored, bytes, endian)?),
            ArrayClass::Single => NumericData::Single(decode_as(stored, bytes, endian)?),
            ArrayClass::Int8 => NumericData::Int8(decode_as(stored, bytes, endian)?),
            ArrayClass::UInt8 => NumericData::UInt8(decode_as(stored, bytes, endian)?),
            ArrayClass::Int16 => NumericData::Int16(decode_as(stored, bytes, endian)?),
            ArrayClass::UInt16 => NumericData::UInt16(decode_as(stored, bytes, endian)?),
            ArrayClass::Int32 => NumericData::Int32(decode_as(stored, bytes, endian)?),
            ArrayClass::UInt32 => NumericData::UInt32(decode_as(stored, bytes, endian)?),
            ArrayClass::Int64 => NumericData::Int64(decode_as(stored, bytes, endian)?),
            ArrayClass::UInt64 => NumericData::UInt64(decode_as(stored, bytes, endian)?),
            other => {
                return Err(Error::invalid_format(format!(
                    "class '{}' has no numeric element type",
                    other
                )))
            }
        })
    }

    /// Append the values in little-endian order to `out`.
    pub(crate) fn encode_le(&self, out: &mut Vec<u8>) {
        each_variant!(self, values => {
            out.reserve(values.len() * self.data_type().size_bytes());
            for value in values {
                value.write_le(out);
            }
        })
    }

    /// The array class these values belong to.
    pub fn class(&self) -> ArrayClass {
        match self {
            NumericData::Double(_) => ArrayClass::Double,
            NumericData::Single(_) => ArrayClass::Single,
            NumericData::Int8(_) => ArrayClass::Int8,
            NumericData::UInt8(_) => ArrayClass::UInt8,
            NumericData::Int16(_) => ArrayClass::Int16,
            NumericData::UInt16(_) => ArrayClass::UInt16,
            NumericData::Int32(_) => ArrayClass::Int32,
            NumericData::UInt32(_) => ArrayClass::UInt32,
            NumericData::Int64(_) => ArrayClass::Int64,
            NumericData::UInt64(_) => ArrayClass::UInt64,
        }
    }

    /// The data type these values are written as.
    pub fn data_type(&self) -> DataType {
        match self {
            NumericData::Double(_) => DataType::Double,
            NumericData::Single(_) => DataType::Single,
            NumericData::Int8(_) => DataType::Int8,
            NumericData::UInt8(_) => DataType::UInt8,
            NumericData::Int16(_) => DataType::Int16,
            NumericData::UInt16(_) => DataType::UInt16,
            NumericData::Int32(_) => DataType::Int32,
            NumericData::UInt32(_) => DataType::UInt32,
            NumericData::Int64(_) => DataType::Int64,
            NumericData::UInt64(_) => DataType::UInt64,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        each_variant!(self, values => values.len())
    }

    /// Check if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the values out as f64.
    ///
    /// 64-bit integers beyond 2^53 lose precision.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        each_variant!(self, values => values.iter().map(|&v| v as f64).collect())
    }
}

macro_rules! impl_from_vec {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$t>> for NumericData {
                fn from(values: Vec<$t>) -> Self {
                    NumericData::$variant(values)
                }
            }
        )*
    };
}

impl_from_vec!(
    f64 => Double,
    f32 => Single,
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
);

/// A full (non-sparse) numeric array, real or complex.
///
/// # Example
///
/// ```
/// use mat5_rs::{ArrayClass, NumericArray};
///
/// let z = NumericArray::complex(vec![1.0, 2.0], vec![0.5, -0.5]);
/// assert!(z.is_complex());
/// assert_eq!(z.class(), ArrayClass::Double);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    /// Real part.
    pub real: NumericData,

    /// Imaginary part, present for complex arrays.
    ///
    /// Normally the same class as `real`. A different class is written in
    /// its own type and comes back converted to the real part's class.
    pub imag: Option<NumericData>,
}

impl NumericArray {
    /// Create a real array.
    pub fn real(real: impl Into<NumericData>) -> Self {
        NumericArray {
            real: real.into(),
            imag: None,
        }
    }

    /// Create a complex array from its real and imaginary parts.
    pub fn complex(real: impl Into<NumericData>, imag: impl Into<NumericData>) -> Self {
        NumericArray {
            real: real.into(),
            imag: Some(imag.into()),
        }
    }

    /// The array class (taken from the real part).
    pub fn class(&self) -> ArrayClass {
        self.real.class()
    }

    /// Check if the array has an imaginary part.
    pub fn is_complex(&self) -> bool {
        self.imag.is_some()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.real.len()
    }

    /// Check if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }
}
