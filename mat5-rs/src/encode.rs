//! Encoding [`Variable`]s as uncompressed miMATRIX elements.
//!
//! Each variable is encoded into memory in full before anything is written,
//! so a variable the format cannot represent never leaves a partial element
//! behind in the output.

use crate::data_type::DataType;
use crate::decode::{FLAG_COMPLEX, FLAG_GLOBAL, FLAG_LOGICAL};
use crate::element::{pad, write_compact_element, write_element, write_tag};
use crate::error::{Error, Result};
use crate::variable::{v5_dims, SparseMatrix, StructArray, Value, Variable};

/// Encode a variable as a complete top-level miMATRIX element.
///
/// The result can be appended directly after a Level 5 header or after any
/// other element.
///
/// # Errors
///
/// - [`Error::UnsupportedClass`] for function handles and opaque objects,
///   at any nesting depth
/// - [`Error::ShapeMismatch`] if the data does not agree with the dimensions
/// - [`Error::TooLarge`] if an element exceeds the 32-bit size field
///
/// # Example
///
/// ```
/// use mat5_rs::{encode_variable, Variable};
///
/// let bytes = encode_variable(&Variable::double("x", vec![1, 1], vec![1.0]))?;
/// // tag + flags + dims + small name + tag + one double
/// assert_eq!(bytes.len(), 8 + 16 + 16 + 8 + 16);
/// # Ok::<(), mat5_rs::Error>(())
/// ```
pub fn encode_variable(var: &Variable) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_matrix(&mut out, var)?;
    Ok(out)
}

fn encode_matrix(out: &mut Vec<u8>, var: &Variable) -> Result<()> {
    let start = out.len();
    write_tag(out, DataType::Matrix, 0);

    encode_body(out, var)?;

    let body_len = out.len() - start - 8;
    let len = u32::try_from(body_len).map_err(|_| Error::too_large(var.name(), body_len))?;
    out[start + 4..start + 8].copy_from_slice(&len.to_le_bytes());
    Ok(())
}

fn encode_body(out: &mut Vec<u8>, var: &Variable) -> Result<()> {
    let name = var.name();
    let class = var.class();

    if let Value::Opaque(_) = var.value() {
        return Err(Error::unsupported_class(name, class));
    }

    let count = var
        .numel()
        .ok_or_else(|| Error::too_large(name, usize::MAX))?;

    // Array flags
    let mut flags = u32::from(class.to_raw());
    if var.is_complex() {
        flags |= FLAG_COMPLEX;
    }
    if var.is_global() {
        flags |= FLAG_GLOBAL;
    }
    if var.is_logical() {
        flags |= FLAG_LOGICAL;
    }
    let nzmax = match var.value() {
        Value::Sparse(matrix) => matrix.nzmax.max(matrix.nnz()),
        _ => 0,
    };
    let nzmax = u32::try_from(nzmax).map_err(|_| Error::too_large(name, nzmax))?;

    let mut flag_bytes = [0u8; 8];
    flag_bytes[..4].copy_from_slice(&flags.to_le_bytes());
    flag_bytes[4..].copy_from_slice(&nzmax.to_le_bytes());
    write_element(out, DataType::UInt32, &flag_bytes);

    // Dimensions
    let dims = v5_dims(var.dims());
    let mut dim_bytes = Vec::with_capacity(dims.len() * 4);
    for &dim in &dims {
        let dim = i32::try_from(dim).map_err(|_| Error::too_large(name, dim))?;
        dim_bytes.extend_from_slice(&dim.to_le_bytes());
    }
    write_element(out, DataType::Int32, &dim_bytes);

    // Name
    write_compact_element(out, DataType::Int8, name.as_bytes());

    match var.value() {
        Value::Numeric(array) => {
            check_count(name, count, array.real.len())?;
            encode_numeric_part(out, &array.real);
            if let Some(imag) = &array.imag {
                check_count(name, count, imag.len())?;
                encode_numeric_part(out, imag);
            }
        }
        Value::Char(units) => {
            check_count(name, count, units.len())?;
            let mut bytes = Vec::with_capacity(units.len() * 2);
            for unit in units {
                bytes.extend_from_slice(&unit.to_le_bytes());
            }
            write_element(out, DataType::UInt16, &bytes);
        }
        Value::Cell(cells) => {
            check_count(name, count, cells.len())?;
            for cell in cells {
                encode_matrix(out, cell)?;
            }
        }
        Value::Struct(fields) => encode_fields(out, name, count, fields)?,
        Value::Object { class_name, fields } => {
            write_compact_element(out, DataType::Int8, class_name.as_bytes());
            encode_fields(out, name, count, fields)?;
        }
        Value::Sparse(matrix) => encode_sparse(out, var, &dims, matrix)?,
        Value::Opaque(_) => unreachable!("rejected above"),
    }

    Ok(())
}

fn check_count(name: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(Error::shape_mismatch(name, expected, found));
    }
    Ok(())
}

fn encode_numeric_part(out: &mut Vec<u8>, data: &crate::numeric::NumericData) {
    let data_type = data.data_type();
    let len = data.len() * data_type.size_bytes();
    write_tag(out, data_type, len);
    data.encode_le(out);
    pad(out, len);
}

fn encode_fields(out: &mut Vec<u8>, name: &str, count: usize, fields: &StructArray) -> Result<()> {
    let expected = count
        .checked_mul(fields.num_fields())
        .ok_or_else(|| Error::too_large(name, usize::MAX))?;
    check_count(name, expected, fields.values().len())?;

    let width = fields.fields().iter().map(String::len).max().unwrap_or(0) + 1;
    let width_i32 = i32::try_from(width).map_err(|_| Error::too_large(name, width))?;
    write_compact_element(out, DataType::Int32, &width_i32.to_le_bytes());

    let mut names = vec![0u8; width * fields.num_fields()];
    for (slot, field) in names.chunks_exact_mut(width).zip(fields.fields()) {
        slot[..field.len()].copy_from_slice(field.as_bytes());
    }
    write_element(out, DataType::Int8, &names);

    for value in fields.values() {
        encode_matrix(out, value)?;
    }
    Ok(())
}

fn encode_sparse(
    out: &mut Vec<u8>,
    var: &Variable,
    dims: &[usize],
    matrix: &SparseMatrix,
) -> Result<()> {
    let name = var.name();

    let cols = match dims {
        [_, cols] => *cols,
        dims => return Err(Error::shape_mismatch(name, 2, dims.len())),
    };
    check_count(name, cols + 1, matrix.col_starts.len())?;

    // Only the first nnz slots are written; any extra capacity is dropped.
    let nnz = matrix.nnz();
    let stored = |found: usize| -> Result<()> {
        if found < nnz {
            return Err(Error::shape_mismatch(name, nnz, found));
        }
        Ok(())
    };
    stored(matrix.row_indices.len())?;
    stored(matrix.real.len())?;
    if let Some(imag) = &matrix.imag {
        stored(imag.len())?;
    }

    let indices = |values: &[usize]| -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(values.len() * 4);
        for &v in values {
            let v = i32::try_from(v).map_err(|_| Error::too_large(name, v))?;
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        Ok(bytes)
    };
    write_element(out, DataType::Int32, &indices(&matrix.row_indices[..nnz])?);
    write_element(out, DataType::Int32, &indices(&matrix.col_starts)?);

    let values = |values: &[f64]| -> (DataType, Vec<u8>) {
        if var.is_logical() {
            let bytes = values.iter().map(|&v| u8::from(v != 0.0)).collect();
            (DataType::UInt8, bytes)
        } else {
            let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
            (DataType::Double, bytes)
        }
    };

    let (data_type, bytes) = values(&matrix.real[..nnz]);
    write_element(out, data_type, &bytes);
    if let Some(imag) = &matrix.imag {
        let (data_type, bytes) = values(&imag[..nnz]);
        write_element(out, data_type, &bytes);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ArrayClass;
    use crate::decode::decode_matrix;
    use crate::endian::Endian;
    use crate::numeric::NumericArray;
    use crate::variable::OpaqueArray;

    /// Encode then decode through the element body.
    fn reencode(var: &Variable) -> Variable {
        let bytes = encode_variable(var).unwrap();
        assert_eq!(bytes.len() % 8, 0);
        assert_eq!(
            u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize,
            bytes.len() - 8
        );
        decode_matrix(&bytes[8..], Endian::Little, 0).unwrap()
    }

    #[test]
    fn test_numeric_layout() {
        let var = Variable::double("x", vec![1, 1], vec![2.5]);
        let bytes = encode_variable(&var).unwrap();

        assert_eq!(&bytes[0..4], &14u32.to_le_bytes());
        // array flags: class double, not complex
        assert_eq!(&bytes[16..20], &6u32.to_le_bytes());
        // small name element "x"
        assert_eq!(&bytes[40..44], &((1u32 << 16) | 1).to_le_bytes());
        assert_eq!(bytes[44], b'x');
        // real part
        assert_eq!(&bytes[48..52], &9u32.to_le_bytes());
        assert_eq!(&bytes[56..64], &2.5f64.to_le_bytes());
    }

    #[test]
    fn test_complex_int_reencodes() {
        let var = Variable::numeric(
            "z",
            vec![1, 3],
            NumericArray::complex(vec![1i16, 2, 3], vec![-1i16, 0, 1]),
        );
        assert_eq!(reencode(&var), var);
    }

    #[test]
    fn test_shape_mismatch() {
        let var = Variable::double("bad", vec![2, 2], vec![1.0]);
        assert!(matches!(
            encode_variable(&var),
            Err(Error::ShapeMismatch { expected: 4, found: 1, .. })
        ));
    }

    #[test]
    fn test_opaque_rejected_when_nested() {
        let fh = Variable::new(
            "",
            vec![1, 1],
            Value::Opaque(OpaqueArray {
                class: ArrayClass::Function,
                payload: vec![0; 8],
            }),
        );
        let cell = Variable::cell("c", vec![1, 1], vec![fh]);
        let err = encode_variable(&cell).unwrap_err();
        assert!(err.is_write_error());
        assert!(matches!(err, Error::UnsupportedClass { class: ArrayClass::Function, .. }));
    }

    #[test]
    fn test_struct_field_width() {
        let s = StructArray::scalar([
            ("a", Variable::double("", vec![1, 1], vec![1.0])),
            ("longer", Variable::text("", "v")),
        ]);
        let var = Variable::structure("s", vec![1, 1], s);
        assert_eq!(reencode(&var), var);
    }

    #[test]
    fn test_empty_struct_reencodes() {
        let var = Variable::structure("e", vec![0, 0], StructArray::default());
        assert_eq!(reencode(&var), var);
    }

    #[test]
    fn test_logical_sparse_reencodes() {
        let matrix = SparseMatrix::new(vec![1, 0], vec![0, 1, 2], vec![1.0, 1.0]);
        let var = Variable::sparse("ls", 2, 2, matrix).with_logical(true);
        assert_eq!(reencode(&var), var);
    }

    #[test]
    fn test_sparse_spare_capacity_dropped() {
        let mut matrix = SparseMatrix::new(vec![1, 0], vec![0, 1], vec![7.0]);
        matrix.imag = Some(vec![-1.0, 0.0]);
        let var = Variable::sparse("S", 2, 1, matrix);

        let back = reencode(&var);
        let Value::Sparse(written) = back.value() else {
            panic!("expected a sparse matrix");
        };
        assert_eq!(written.nzmax, 2);
        assert_eq!(written.row_indices, vec![1]);
        assert_eq!(written.real, vec![7.0]);
        assert_eq!(written.imag, Some(vec![-1.0]));
    }

    #[test]
    fn test_sparse_too_few_values() {
        let matrix = SparseMatrix::new(vec![0, 1], vec![0, 2], vec![1.0]);
        let var = Variable::sparse("sp", 2, 1, matrix);
        assert!(matches!(
            encode_variable(&var),
            Err(Error::ShapeMismatch { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn test_vector_dims_written_as_column() {
        let var = Variable::double("v", vec![3], vec![1.0, 2.0, 3.0]);
        let back = reencode(&var);
        assert_eq!(back.dims(), &[3, 1]);
        assert_eq!(back.value(), var.value());
    }

    #[test]
    fn test_scalar_dims_written_as_one_by_one() {
        let var = Variable::double("s", vec![], vec![4.0]);
        let bytes = encode_variable(&var).unwrap();
        // dimensions element: miINT32, 8 bytes, [1, 1]
        assert_eq!(&bytes[24..28], &5u32.to_le_bytes());
        assert_eq!(&bytes[28..32], &8u32.to_le_bytes());
        assert_eq!(&bytes[32..40], &[1, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(reencode(&var).dims(), &[1, 1]);
    }

    #[test]
    fn test_sparse_bad_columns() {
        let matrix = SparseMatrix::new(vec![0], vec![0, 1], vec![1.0]);
        let var = Variable::sparse("sp", 2, 3, matrix);
        assert!(matches!(
            encode_variable(&var),
            Err(Error::ShapeMismatch { expected: 4, found: 2, .. })
        ));
    }
}
