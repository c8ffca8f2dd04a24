//! MAT data element type enumeration.
//!
//! Every Level 5 data element starts with a tag naming one of these types.
//! Numeric types describe how the element's bytes are stored, which may be
//! narrower than the class of the array they belong to.

use std::fmt;

/// Level 5 data element types (`mi*` constants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DataType {
    /// 8-bit signed integer (i8)
    Int8 = 1,

    /// 8-bit unsigned integer (u8)
    UInt8 = 2,

    /// 16-bit signed integer (i16)
    Int16 = 3,

    /// 16-bit unsigned integer (u16)
    UInt16 = 4,

    /// 32-bit signed integer (i32)
    Int32 = 5,

    /// 32-bit unsigned integer (u32)
    UInt32 = 6,

    /// 32-bit floating point (f32)
    Single = 7,

    /// 64-bit floating point (f64)
    Double = 9,

    /// 64-bit signed integer (i64)
    Int64 = 12,

    /// 64-bit unsigned integer (u64)
    UInt64 = 13,

    /// Nested array (miMATRIX)
    Matrix = 14,

    /// zlib-compressed data element
    Compressed = 15,

    /// UTF-8 encoded character data
    Utf8 = 16,

    /// UTF-16 encoded character data
    Utf16 = 17,

    /// UTF-32 encoded character data
    Utf32 = 18,
}

impl DataType {
    /// Create a DataType from its raw tag value.
    ///
    /// # Returns
    ///
    /// The corresponding `DataType`, or `None` for reserved or unknown values.
    pub fn from_raw(value: u32) -> Option<Self> {
        Some(match value {
            1 => DataType::Int8,
            2 => DataType::UInt8,
            3 => DataType::Int16,
            4 => DataType::UInt16,
            5 => DataType::Int32,
            6 => DataType::UInt32,
            7 => DataType::Single,
            9 => DataType::Double,
            12 => DataType::Int64,
            13 => DataType::UInt64,
            14 => DataType::Matrix,
            15 => DataType::Compressed,
            16 => DataType::Utf8,
            17 => DataType::Utf16,
            18 => DataType::Utf32,
            _ => return None,
        })
    }

    /// Get the raw tag value.
    pub const fn to_raw(self) -> u32 {
        self as u32
    }

    /// Get the size in bytes of a single element of this type.
    ///
    /// # Returns
    ///
    /// The byte size, or 0 for `Matrix` and `Compressed`, whose contents
    /// are not a flat array of values.
    pub const fn size_bytes(&self) -> usize {
        match self {
            DataType::Int8 | DataType::UInt8 | DataType::Utf8 => 1,
            DataType::Int16 | DataType::UInt16 | DataType::Utf16 => 2,
            DataType::Int32 | DataType::UInt32 | DataType::Single | DataType::Utf32 => 4,
            DataType::Double | DataType::Int64 | DataType::UInt64 => 8,
            DataType::Matrix | DataType::Compressed => 0,
        }
    }

    /// Check if this type is a floating-point type.
    pub const fn is_float(&self) -> bool {
        matches!(self, DataType::Single | DataType::Double)
    }

    /// Check if this type is an integer type.
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::Int8
                | DataType::UInt8
                | DataType::Int16
                | DataType::UInt16
                | DataType::Int32
                | DataType::UInt32
                | DataType::Int64
                | DataType::UInt64
        )
    }

    /// Check if this type can hold numeric array data.
    pub const fn is_numeric(&self) -> bool {
        self.is_float() || self.is_integer()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int8 => "miINT8",
            DataType::UInt8 => "miUINT8",
            DataType::Int16 => "miINT16",
            DataType::UInt16 => "miUINT16",
            DataType::Int32 => "miINT32",
            DataType::UInt32 => "miUINT32",
            DataType::Single => "miSINGLE",
            DataType::Double => "miDOUBLE",
            DataType::Int64 => "miINT64",
            DataType::UInt64 => "miUINT64",
            DataType::Matrix => "miMATRIX",
            DataType::Compressed => "miCOMPRESSED",
            DataType::Utf8 => "miUTF8",
            DataType::Utf16 => "miUTF16",
            DataType::Utf32 => "miUTF32",
        };
        f.write_str(name)
    }
}
