//! MATLAB array classes.
//!
//! The class of an array lives in the low byte of its array-flags
//! sub-element and decides how the rest of the miMATRIX element is laid out.

use std::fmt;

use crate::data_type::DataType;

/// Array classes (`mx*_CLASS` constants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ArrayClass {
    /// Cell array
    Cell = 1,
    /// Structure array
    Struct = 2,
    /// Object (structure with a class name)
    Object = 3,
    /// Character array
    Char = 4,
    /// Sparse matrix
    Sparse = 5,
    /// Double precision
    Double = 6,
    /// Single precision
    Single = 7,
    /// Signed 8-bit integer
    Int8 = 8,
    /// Unsigned 8-bit integer
    UInt8 = 9,
    /// Signed 16-bit integer
    Int16 = 10,
    /// Unsigned 16-bit integer
    UInt16 = 11,
    /// Signed 32-bit integer
    Int32 = 12,
    /// Unsigned 32-bit integer
    UInt32 = 13,
    /// Signed 64-bit integer
    Int64 = 14,
    /// Unsigned 64-bit integer
    UInt64 = 15,
    /// Function handle
    Function = 16,
    /// Opaque class instance (MCOS objects, tables, strings)
    Opaque = 17,
}

impl ArrayClass {
    /// Create an ArrayClass from its raw flag byte.
    pub fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            1 => ArrayClass::Cell,
            2 => ArrayClass::Struct,
            3 => ArrayClass::Object,
            4 => ArrayClass::Char,
            5 => ArrayClass::Sparse,
            6 => ArrayClass::Double,
            7 => ArrayClass::Single,
            8 => ArrayClass::Int8,
            9 => ArrayClass::UInt8,
            10 => ArrayClass::Int16,
            11 => ArrayClass::UInt16,
            12 => ArrayClass::Int32,
            13 => ArrayClass::UInt32,
            14 => ArrayClass::Int64,
            15 => ArrayClass::UInt64,
            16 => ArrayClass::Function,
            17 => ArrayClass::Opaque,
            _ => return None,
        })
    }

    /// Get the raw flag byte.
    pub const fn to_raw(self) -> u8 {
        self as u8
    }

    /// Check if this is one of the ten numeric classes.
    pub const fn is_numeric(&self) -> bool {
        self.native_type().is_some()
    }

    /// Check if arrays of this class can be written to a version 5 file.
    ///
    /// Function handles and opaque objects are only ever read.
    pub const fn is_writable(&self) -> bool {
        !matches!(self, ArrayClass::Function | ArrayClass::Opaque)
    }

    /// The data type matching this class's element type, for numeric classes.
    pub const fn native_type(&self) -> Option<DataType> {
        match self {
            ArrayClass::Double => Some(DataType::Double),
            ArrayClass::Single => Some(DataType::Single),
            ArrayClass::Int8 => Some(DataType::Int8),
            ArrayClass::UInt8 => Some(DataType::UInt8),
            ArrayClass::Int16 => Some(DataType::Int16),
            ArrayClass::UInt16 => Some(DataType::UInt16),
            ArrayClass::Int32 => Some(DataType::Int32),
            ArrayClass::UInt32 => Some(DataType::UInt32),
            ArrayClass::Int64 => Some(DataType::Int64),
            ArrayClass::UInt64 => Some(DataType::UInt64),
            _ => None,
        }
    }
}

impl fmt::Display for ArrayClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArrayClass::Cell => "cell",
            ArrayClass::Struct => "struct",
            ArrayClass::Object => "object",
            ArrayClass::Char => "char",
            ArrayClass::Sparse => "sparse",
            ArrayClass::Double => "double",
            ArrayClass::Single => "single",
            ArrayClass::Int8 => "int8",
            ArrayClass::UInt8 => "uint8",
            ArrayClass::Int16 => "int16",
            ArrayClass::UInt16 => "uint16",
            ArrayClass::Int32 => "int32",
            ArrayClass::UInt32 => "uint32",
            ArrayClass::Int64 => "int64",
            ArrayClass::UInt64 => "uint64",
            ArrayClass::Function => "function_handle",
            ArrayClass::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw() {
        assert_eq!(ArrayClass::from_raw(6), Some(ArrayClass::Double));
        assert_eq!(ArrayClass::from_raw(17), Some(ArrayClass::Opaque));
        assert_eq!(ArrayClass::from_raw(0), None);
        assert_eq!(ArrayClass::from_raw(18), None);
    }

    #[test]
    fn test_native_type() {
        assert_eq!(ArrayClass::Double.native_type(), Some(DataType::Double));
        assert_eq!(ArrayClass::UInt16.native_type(), Some(DataType::UInt16));
        assert_eq!(ArrayClass::Char.native_type(), None);
        assert!(ArrayClass::Int64.is_numeric());
        assert!(!ArrayClass::Sparse.is_numeric());
    }

    #[test]
    fn test_is_writable() {
        assert!(ArrayClass::Sparse.is_writable());
        assert!(ArrayClass::Object.is_writable());
        assert!(!ArrayClass::Function.is_writable());
        assert!(!ArrayClass::Opaque.is_writable());
    }
}
