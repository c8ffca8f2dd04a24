//! Individual MAT variable representation.
//!
//! A [`Variable`] is one named value from a container: its dimensions, its
//! array flags, and a [`Value`] tagged by the kind of array it holds.
//! Variables are self-describing, so a reader can hand them to a writer
//! without interpreting the data.
//!
//! # Data Layout
//!
//! All element sequences (numeric values, characters, cell contents, struct
//! elements) are kept in MATLAB's column-major order.

use crate::class::ArrayClass;
use crate::numeric::{NumericArray, NumericData};

/// A named variable from a MAT file.
///
/// # Example
///
/// ```
/// use mat5_rs::{ArrayClass, Variable};
///
/// let v = Variable::double("x", vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
/// assert_eq!(v.name(), "x");
/// assert_eq!(v.class(), ArrayClass::Double);
/// assert_eq!(v.numel(), Some(6));
/// assert_eq!(v.describe(), "2x3 double");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Variable name. Empty for cell contents and struct field values.
    name: String,

    /// Dimensions, at least two for Level 5 data.
    dims: Vec<usize>,

    /// The global flag.
    global: bool,

    /// The logical flag (numeric uint8 or sparse arrays only).
    logical: bool,

    /// The data itself.
    value: Value,
}

/// The data of a variable, by kind of array.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Full numeric array of any of the ten numeric classes.
    Numeric(NumericArray),

    /// Character array as UTF-16 code units.
    Char(Vec<u16>),

    /// Cell array; one variable per element.
    Cell(Vec<Variable>),

    /// Structure array.
    Struct(StructArray),

    /// Object: a structure array tagged with a class name.
    Object {
        /// MATLAB class name.
        class_name: String,
        /// Field names and values.
        fields: StructArray,
    },

    /// Sparse matrix in compressed-column form.
    Sparse(SparseMatrix),

    /// Function handle or opaque class instance, kept as undecoded bytes.
    Opaque(OpaqueArray),
}

impl Value {
    /// The MAT class of this value.
    pub fn class(&self) -> ArrayClass {
        match self {
            Value::Numeric(array) => array.class(),
            Value::Char(_) => ArrayClass::Char,
            Value::Cell(_) => ArrayClass::Cell,
            Value::Struct(_) => ArrayClass::Struct,
            Value::Object { .. } => ArrayClass::Object,
            Value::Sparse(_) => ArrayClass::Sparse,
            Value::Opaque(opaque) => opaque.class,
        }
    }
}

/// Field names plus one value per (element, field) pair.
///
/// `values` is element-major: all fields of element 0, then all fields of
/// element 1, and so on, with elements in column-major order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructArray {
    fields: Vec<String>,
    values: Vec<Variable>,
}

impl StructArray {
    /// Create a structure array from field names and element-major values.
    pub fn new(fields: Vec<String>, values: Vec<Variable>) -> Self {
        StructArray { fields, values }
    }

    /// Create a 1x1 structure from `(field, value)` pairs.
    pub fn scalar<S: Into<String>>(entries: impl IntoIterator<Item = (S, Variable)>) -> Self {
        let (fields, values) = entries
            .into_iter()
            .map(|(field, value)| (field.into(), value))
            .unzip();
        StructArray { fields, values }
    }

    /// Field names in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// All field values, element-major.
    pub fn values(&self) -> &[Variable] {
        &self.values
    }

    /// Number of fields.
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Look up the value of `field` in element `index`.
    pub fn get(&self, index: usize, field: &str) -> Option<&Variable> {
        let column = self.fields.iter().position(|f| f == field)?;
        self.values.get(index * self.fields.len() + column)
    }
}

/// A sparse matrix in compressed-column form.
///
/// MATLAB sparse matrices are always two-dimensional and hold either
/// doubles or logicals (see [`Variable::is_logical`]).
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    /// Allocated capacity recorded in the array flags. Never less than the
    /// number of stored entries when written.
    pub nzmax: usize,

    /// Row index of each stored entry.
    pub row_indices: Vec<usize>,

    /// Offset into `row_indices` where each column starts, plus the total.
    pub col_starts: Vec<usize>,

    /// Real values of the stored entries.
    pub real: Vec<f64>,

    /// Imaginary values, for complex matrices.
    pub imag: Option<Vec<f64>>,
}

impl SparseMatrix {
    /// Create a real sparse matrix sized exactly for its entries.
    pub fn new(row_indices: Vec<usize>, col_starts: Vec<usize>, real: Vec<f64>) -> Self {
        SparseMatrix {
            nzmax: row_indices.len(),
            row_indices,
            col_starts,
            real,
            imag: None,
        }
    }

    /// Number of stored entries, from the last column offset.
    pub fn nnz(&self) -> usize {
        self.col_starts.last().copied().unwrap_or(0)
    }
}

/// Bytes of an array whose contents this crate does not interpret.
///
/// The payload is everything after the array name, in the byte order of
/// the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueArray {
    /// `Function` or `Opaque`.
    pub class: ArrayClass,

    /// Undecoded sub-elements.
    pub payload: Vec<u8>,
}

impl Variable {
    /// Create a variable from its parts.
    pub fn new(name: impl Into<String>, dims: Vec<usize>, value: Value) -> Self {
        Variable {
            name: name.into(),
            dims,
            global: false,
            logical: false,
            value,
        }
    }

    /// Create a numeric variable.
    pub fn numeric(name: impl Into<String>, dims: Vec<usize>, array: NumericArray) -> Self {
        Self::new(name, dims, Value::Numeric(array))
    }

    /// Create a real double variable.
    pub fn double(name: impl Into<String>, dims: Vec<usize>, data: Vec<f64>) -> Self {
        Self::numeric(name, dims, NumericArray::real(data))
    }

    /// Create a logical variable (uint8 storage with the logical flag).
    pub fn logical(name: impl Into<String>, dims: Vec<usize>, data: &[bool]) -> Self {
        let bytes: Vec<u8> = data.iter().map(|&b| u8::from(b)).collect();
        Self::numeric(name, dims, NumericArray::real(bytes)).with_logical(true)
    }

    /// Create a 1xN character row vector from a string.
    pub fn text(name: impl Into<String>, text: &str) -> Self {
        let units: Vec<u16> = text.encode_utf16().collect();
        let dims = vec![1, units.len()];
        Self::new(name, dims, Value::Char(units))
    }

    /// Create a cell array.
    pub fn cell(name: impl Into<String>, dims: Vec<usize>, cells: Vec<Variable>) -> Self {
        Self::new(name, dims, Value::Cell(cells))
    }

    /// Create a structure array.
    pub fn structure(name: impl Into<String>, dims: Vec<usize>, fields: StructArray) -> Self {
        Self::new(name, dims, Value::Struct(fields))
    }

    /// Create a sparse matrix of the given size.
    pub fn sparse(name: impl Into<String>, rows: usize, cols: usize, matrix: SparseMatrix) -> Self {
        Self::new(name, vec![rows, cols], Value::Sparse(matrix))
    }

    /// Set the global flag.
    pub fn with_global(mut self, global: bool) -> Self {
        self.global = global;
        self
    }

    /// Set the logical flag.
    pub fn with_logical(mut self, logical: bool) -> Self {
        self.logical = logical;
        self
    }

    /// Get the variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the variable name.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Get the dimensions.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Total number of elements, or `None` if the product overflows.
    pub fn numel(&self) -> Option<usize> {
        numel(&self.dims)
    }

    /// Get the array class.
    pub fn class(&self) -> ArrayClass {
        self.value.class()
    }

    /// Check the global flag.
    pub fn is_global(&self) -> bool {
        self.global
    }

    /// Check the logical flag.
    pub fn is_logical(&self) -> bool {
        self.logical
    }

    /// Check if the data has an imaginary part.
    pub fn is_complex(&self) -> bool {
        match &self.value {
            Value::Numeric(array) => array.is_complex(),
            Value::Sparse(matrix) => matrix.imag.is_some(),
            _ => false,
        }
    }

    /// Borrow the data.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Take the data.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Decode a character array as a string.
    ///
    /// Characters come back in storage order, so multi-row arrays read
    /// column by column. Returns `None` for non-character variables.
    pub fn as_text(&self) -> Option<String> {
        match &self.value {
            Value::Char(units) => Some(String::from_utf16_lossy(units)),
            _ => None,
        }
    }

    /// Dimensions formatted MATLAB-style, e.g. `3x4`.
    pub fn dims_string(&self) -> String {
        self.dims
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("x")
    }

    /// One-line summary such as `3x4 double complex`.
    pub fn describe(&self) -> String {
        let mut parts = vec![self.dims_string()];

        if self.logical {
            parts.push("logical".to_string());
        } else {
            parts.push(self.class().to_string());
        }

        if let Value::Sparse(_) = self.value {
            if !self.logical {
                parts.push("(double)".to_string());
            }
        }
        if let Value::Object { class_name, .. } = &self.value {
            parts.push(format!("({})", class_name));
        }
        if self.is_complex() {
            parts.push("complex".to_string());
        }
        if self.global {
            parts.push("global".to_string());
        }

        parts.join(" ")
    }
}

/// Product of dimensions, `None` on overflow.
pub(crate) fn numel(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// Dimensions as a version 5 file stores them: at least two entries.
///
/// A vector `[n]` becomes the column `[n, 1]` and a scalar `[]` becomes
/// `[1, 1]`. The element count is unchanged.
pub(crate) fn v5_dims(dims: &[usize]) -> Vec<usize> {
    let mut dims = dims.to_vec();
    while dims.len() < 2 {
        dims.push(1);
    }
    dims
}

// ============================================================================
// ndarray Integration
// ============================================================================

#[cfg(feature = "ndarray")]
use ndarray::{ArrayD, IxDyn, ShapeBuilder};

#[cfg(feature = "ndarray")]
impl Variable {
    /// Get the real part of a numeric variable as an n-dimensional f64 array.
    ///
    /// The array uses column-major (Fortran) layout, so indexing matches
    /// MATLAB's subscripts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`](crate::Error::InvalidFormat) for
    /// non-numeric variables or if the data does not fill the dimensions.
    pub fn to_array_f64(&self) -> crate::Result<ArrayD<f64>> {
        let array = match &self.value {
            Value::Numeric(array) => array,
            _ => {
                return Err(crate::Error::invalid_format(format!(
                    "Variable '{}' is not numeric (class: {})",
                    self.name,
                    self.class()
                )))
            }
        };

        ArrayD::from_shape_vec(IxDyn(&self.dims).f(), array.real.to_f64_vec())
            .map_err(|e| crate::Error::invalid_format(format!("Shape error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_variable() {
        let v = Variable::text("greeting", "héllo");
        assert_eq!(v.dims(), &[1, 5]);
        assert_eq!(v.class(), ArrayClass::Char);
        assert_eq!(v.as_text().as_deref(), Some("héllo"));
    }

    #[test]
    fn test_logical_variable() {
        let v = Variable::logical("mask", vec![1, 3], &[true, false, true]);
        assert!(v.is_logical());
        assert_eq!(v.class(), ArrayClass::UInt8);
        assert_eq!(
            v.value(),
            &Value::Numeric(NumericArray::real(vec![1u8, 0, 1]))
        );
        assert_eq!(v.describe(), "1x3 logical");
    }

    #[test]
    fn test_numel_overflow() {
        assert_eq!(numel(&[usize::MAX, 2]), None);
        assert_eq!(numel(&[0, 5]), Some(0));
        assert_eq!(numel(&[]), Some(1));
    }

    #[test]
    fn test_struct_lookup() {
        let s = StructArray::scalar([
            ("a", Variable::double("", vec![1, 1], vec![1.0])),
            ("b", Variable::text("", "x")),
        ]);
        assert_eq!(s.num_fields(), 2);
        assert_eq!(s.fields(), &["a".to_string(), "b".to_string()]);
        assert_eq!(s.get(0, "b").and_then(|v| v.as_text()).as_deref(), Some("x"));
        assert!(s.get(0, "c").is_none());
        assert!(s.get(1, "a").is_none());
    }

    #[test]
    fn test_describe_flags() {
        let v = Variable::numeric(
            "z",
            vec![2, 1],
            NumericArray::complex(vec![1i32, 2], vec![0i32, 1]),
        )
        .with_global(true);
        assert_eq!(v.describe(), "2x1 int32 complex global");

        let sparse = Variable::sparse("s", 3, 3, SparseMatrix::new(vec![0], vec![0, 1, 1, 1], vec![2.0]));
        assert_eq!(sparse.describe(), "3x3 sparse (double)");
        assert_eq!(sparse.value().class(), ArrayClass::Sparse);
    }

    #[test]
    fn test_sparse_nnz() {
        let m = SparseMatrix::new(vec![0, 2], vec![0, 1, 2], vec![1.0, 2.0]);
        assert_eq!(m.nnz(), 2);
        assert_eq!(m.nzmax, 2);
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn test_to_array_f64_column_major() {
        let v = Variable::double("m", vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]);
        let array = v.to_array_f64().unwrap();
        assert_eq!(array[[0, 1]], 3.0);
        assert_eq!(array[[1, 0]], 2.0);
    }
}
