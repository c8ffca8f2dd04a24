//! Decoding miMATRIX elements into [`Variable`]s.
//!
//! The body of a miMATRIX element is a sequence of sub-elements:
//! array flags, dimensions, name, then class-specific data. Cells and
//! structures nest further miMATRIX elements, so decoding is recursive
//! with a depth limit.

use log::trace;

use crate::class::ArrayClass;
use crate::data_type::DataType;
use crate::element::{Elements, RawElement};
use crate::endian::{decode_as, read_values, Endian};
use crate::error::{Error, Result};
use crate::numeric::{NumericArray, NumericData};
use crate::variable::{
    numel, v5_dims, OpaqueArray, SparseMatrix, StructArray, Value, Variable,
};

/// Deepest nesting of cells and structures accepted.
pub(crate) const MAX_DEPTH: usize = 64;

pub(crate) const FLAG_COMPLEX: u32 = 0x0800;
pub(crate) const FLAG_GLOBAL: u32 = 0x0400;
pub(crate) const FLAG_LOGICAL: u32 = 0x0200;

/// Decode the body of a miMATRIX element (everything after its tag).
pub(crate) fn decode_matrix(body: &[u8], endian: Endian, depth: usize) -> Result<Variable> {
    if depth > MAX_DEPTH {
        return Err(Error::invalid_format(format!(
            "arrays nested deeper than {} levels",
            MAX_DEPTH
        )));
    }

    // Some writers emit a bare tag for empty cell contents.
    if body.is_empty() {
        return Ok(Variable::double("", vec![0, 0], Vec::new()));
    }

    let mut elements = Elements::new(body, endian);

    let flags_el = elements.expect("array flags")?;
    if flags_el.data.len() < 8 {
        return Err(Error::invalid_format(format!(
            "array flags are {} bytes, expected 8",
            flags_el.data.len()
        )));
    }
    let flags = endian.u32(&flags_el.data[..4]);
    let nzmax = endian.u32(&flags_el.data[4..8]) as usize;

    let class = ArrayClass::from_raw((flags & 0xFF) as u8).ok_or_else(|| {
        Error::invalid_format(format!("unknown array class {}", flags & 0xFF))
    })?;
    let complex = flags & FLAG_COMPLEX != 0;
    let global = flags & FLAG_GLOBAL != 0;
    let logical = flags & FLAG_LOGICAL != 0;

    // Opaque instances carry no dimensions sub-element.
    if class == ArrayClass::Opaque {
        let name = read_name(&mut elements)?;
        let value = Value::Opaque(OpaqueArray {
            class,
            payload: elements.remaining().to_vec(),
        });
        return Ok(Variable::new(name, vec![1, 1], value).with_global(global));
    }

    let dims = read_dims(&mut elements, endian)?;
    let name = read_name(&mut elements)?;
    let count = numel(&dims)
        .ok_or_else(|| Error::invalid_format(format!("'{}': dimensions {:?} overflow", name, dims)))?;

    trace!("decoding '{}': {} {:?} depth {}", name, class, dims, depth);

    let value = match class {
        ArrayClass::Char => Value::Char(decode_char(&mut elements, &name, count, endian)?),
        ArrayClass::Cell => {
            let mut cells = Vec::with_capacity(count.min(body.len() / 8));
            for _ in 0..count {
                let el = expect_matrix(&mut elements, "cell element")?;
                cells.push(decode_matrix(el.data, endian, depth + 1)?);
            }
            Value::Cell(cells)
        }
        ArrayClass::Struct => {
            Value::Struct(decode_struct(&mut elements, &name, count, endian, depth)?)
        }
        ArrayClass::Object => {
            let class_name = read_string(elements.expect("object class name")?);
            let fields = decode_struct(&mut elements, &name, count, endian, depth)?;
            Value::Object { class_name, fields }
        }
        ArrayClass::Sparse => {
            Value::Sparse(decode_sparse(&mut elements, &name, &dims, nzmax, complex, endian)?)
        }
        ArrayClass::Function | ArrayClass::Opaque => Value::Opaque(OpaqueArray {
            class,
            payload: elements.remaining().to_vec(),
        }),
        numeric => Value::Numeric(decode_numeric(
            &mut elements,
            &name,
            numeric,
            count,
            complex,
            endian,
        )?),
    };

    Ok(Variable::new(name, dims, value)
        .with_global(global)
        .with_logical(logical))
}

/// Read the dimensions sub-element.
fn read_dims(elements: &mut Elements<'_>, endian: Endian) -> Result<Vec<usize>> {
    let el = elements.expect("dimensions")?;
    let raw: Vec<i64> = decode_as(el.data_type()?, el.data, endian)?;

    let dims = raw
        .into_iter()
        .map(|d| {
            usize::try_from(d)
                .map_err(|_| Error::invalid_format(format!("negative dimension {}", d)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(v5_dims(&dims))
}

/// Read the array name sub-element.
fn read_name(elements: &mut Elements<'_>) -> Result<String> {
    Ok(read_string(elements.expect("array name")?))
}

/// Interpret an element as NUL-padded 8-bit text.
fn read_string(el: RawElement<'_>) -> String {
    let end = el.data.iter().position(|&b| b == 0).unwrap_or(el.data.len());
    String::from_utf8_lossy(&el.data[..end]).into_owned()
}

fn expect_matrix<'a>(elements: &mut Elements<'a>, what: &str) -> Result<RawElement<'a>> {
    let el = elements.expect(what)?;
    if el.data_type()? != DataType::Matrix {
        return Err(Error::invalid_format(format!(
            "{} is {}, expected miMATRIX",
            what,
            el.data_type()?
        )));
    }
    Ok(el)
}

fn decode_numeric(
    elements: &mut Elements<'_>,
    name: &str,
    class: ArrayClass,
    count: usize,
    complex: bool,
    endian: Endian,
) -> Result<NumericArray> {
    let mut read_part = |part: &str| -> Result<NumericData> {
        let data = match elements.next_element()? {
            Some(el) => NumericData::decode(class, el.data_type()?, el.data, endian)?,
            None if count == 0 => NumericData::decode(class, DataType::Double, &[], endian)?,
            None => return Err(Error::invalid_format(format!("'{}': missing {} part", name, part))),
        };
        if data.len() != count {
            return Err(Error::invalid_format(format!(
                "'{}': {} part has {} elements, dimensions need {}",
                name,
                part,
                data.len(),
                count
            )));
        }
        Ok(data)
    };

    let real = read_part("real")?;
    let imag = if complex { Some(read_part("imaginary")?) } else { None };

    Ok(NumericArray { real, imag })
}

fn decode_char(
    elements: &mut Elements<'_>,
    name: &str,
    count: usize,
    endian: Endian,
) -> Result<Vec<u16>> {
    let el = match elements.next_element()? {
        Some(el) => el,
        None if count == 0 => return Ok(Vec::new()),
        None => return Err(Error::invalid_format(format!("'{}': missing character data", name))),
    };

    let units: Vec<u16> = match el.data_type()? {
        DataType::UInt16 | DataType::Utf16 | DataType::Int16 => read_values(el.data, endian)?,
        DataType::Utf8 => String::from_utf8_lossy(el.data).encode_utf16().collect(),
        DataType::UInt8 | DataType::Int8 => el.data.iter().map(|&b| u16::from(b)).collect(),
        DataType::Utf32 | DataType::UInt32 | DataType::Int32 => {
            let mut units = Vec::with_capacity(el.data.len() / 4);
            let mut buf = [0u16; 2];
            for code in read_values::<u32>(el.data, endian)? {
                let c = char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
                units.extend_from_slice(c.encode_utf16(&mut buf));
            }
            units
        }
        other => {
            return Err(Error::invalid_format(format!(
                "'{}': {} cannot hold character data",
                name, other
            )))
        }
    };

    if units.len() != count {
        return Err(Error::invalid_format(format!(
            "'{}': {} characters, dimensions need {}",
            name,
            units.len(),
            count
        )));
    }

    Ok(units)
}

fn decode_struct(
    elements: &mut Elements<'_>,
    name: &str,
    count: usize,
    endian: Endian,
    depth: usize,
) -> Result<StructArray> {
    let width_el = elements.expect("field name length")?;
    if width_el.data.len() < 4 {
        return Err(Error::invalid_format(format!("'{}': bad field name length", name)));
    }
    let width = usize::try_from(endian.i32(width_el.data))
        .map_err(|_| Error::invalid_format(format!("'{}': negative field name length", name)))?;

    let names_el = elements.expect("field names")?;
    let fields: Vec<String> = if width == 0 {
        Vec::new()
    } else {
        names_el
            .data
            .chunks_exact(width)
            .map(|chunk| {
                let end = chunk.iter().position(|&b| b == 0).unwrap_or(chunk.len());
                String::from_utf8_lossy(&chunk[..end]).into_owned()
            })
            .collect()
    };

    let total = count.checked_mul(fields.len()).ok_or_else(|| {
        Error::invalid_format(format!("'{}': too many struct values", name))
    })?;

    let mut values = Vec::with_capacity(total.min(elements.remaining().len() / 8));
    for _ in 0..total {
        let el = expect_matrix(elements, "struct field value")?;
        values.push(decode_matrix(el.data, endian, depth + 1)?);
    }

    Ok(StructArray::new(fields, values))
}

fn decode_sparse(
    elements: &mut Elements<'_>,
    name: &str,
    dims: &[usize],
    nzmax: usize,
    complex: bool,
    endian: Endian,
) -> Result<SparseMatrix> {
    let cols = match dims {
        [_, cols] => *cols,
        _ => {
            return Err(Error::invalid_format(format!(
                "'{}': sparse matrix must be 2-D, got {:?}",
                name, dims
            )))
        }
    };

    let read_indices = |el: RawElement<'_>| -> Result<Vec<usize>> {
        decode_as::<i64>(el.data_type()?, el.data, endian)?
            .into_iter()
            .map(|i| {
                usize::try_from(i)
                    .map_err(|_| Error::invalid_format(format!("'{}': negative index {}", name, i)))
            })
            .collect()
    };

    let row_indices = read_indices(elements.expect("sparse row indices")?)?;
    let col_starts = read_indices(elements.expect("sparse column offsets")?)?;

    if col_starts.len() != cols + 1 {
        return Err(Error::invalid_format(format!(
            "'{}': {} column offsets for {} columns",
            name,
            col_starts.len(),
            cols
        )));
    }

    let real_el = elements.expect("sparse values")?;
    let real: Vec<f64> = decode_as(real_el.data_type()?, real_el.data, endian)?;

    let imag = if complex {
        let el = elements.expect("sparse imaginary values")?;
        Some(decode_as::<f64>(el.data_type()?, el.data, endian)?)
    } else {
        None
    };

    let nnz = col_starts[cols];
    let imag_len = imag.as_ref().map_or(nnz, Vec::len);
    if nnz > row_indices.len() || nnz > real.len() || nnz > imag_len {
        return Err(Error::invalid_format(format!(
            "'{}': {} stored entries but {} row indices and {} values",
            name,
            nnz,
            row_indices.len(),
            real.len().min(imag_len)
        )));
    }

    // Slots past the last column offset are unused capacity.
    let mut row_indices = row_indices;
    let mut real = real;
    let mut imag = imag;
    row_indices.truncate(nnz);
    real.truncate(nnz);
    if let Some(imag) = imag.as_mut() {
        imag.truncate(nnz);
    }

    Ok(SparseMatrix {
        nzmax: nzmax.max(nnz),
        row_indices,
        col_starts,
        real,
        imag,
    })
}
