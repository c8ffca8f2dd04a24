//! Sequential MAT file reading.
//!
//! This module provides [`MatReader`], the entry point for reading MAT
//! containers one variable at a time.
//!
//! # Example
//!
//! ```no_run
//! use mat5_rs::MatReader;
//!
//! let mut reader = MatReader::open("analysis.mat")?;
//! while let Some(var) = reader.read_next()? {
//!     println!("{}: {}", var.name(), var.describe());
//! }
//! # Ok::<(), mat5_rs::Error>(())
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Chain, Cursor, ErrorKind, Read};
use std::path::Path;

use flate2::read::ZlibDecoder;
use log::{debug, warn};

use crate::data_type::DataType;
use crate::decode::decode_matrix;
use crate::element::{padded_len, parse_tag, TAG_LEN};
use crate::endian::Endian;
use crate::error::{Error, Result};
use crate::header::{Header, HEADER_LEN};
use crate::v4::{decode_v4, V4Header, V4_HEADER_LEN};
use crate::variable::Variable;

/// Default cap on the inflated size of one compressed variable (2 GiB).
pub const DEFAULT_INFLATE_LIMIT: u64 = 1 << 31;

/// Container level of an opened file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatVersion {
    /// MATLAB 4 files, no file header.
    Level4,
    /// MATLAB 5 through 7 files (v5, v6, v7 with compression).
    Level5,
}

impl fmt::Display for MatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatVersion::Level4 => f.write_str("Level 4"),
            MatVersion::Level5 => f.write_str("Level 5"),
        }
    }
}

/// A MAT file opened for reading.
///
/// Variables are decoded lazily, one per call to
/// [`read_next()`](Self::read_next), in file order. The sequence is finite
/// and cannot be restarted. Dropping the reader closes the file.
///
/// # Errors while iterating
///
/// When an element was read completely but its contents do not decode,
/// `read_next` returns the error and the reader stays positioned at the
/// next element, so iteration can continue. When the stream itself is
/// truncated or unreadable, the error is returned once and every later
/// call returns `Ok(None)`.
///
/// # Example
///
/// ```no_run
/// use mat5_rs::MatReader;
///
/// let reader = MatReader::open("input.mat")?;
/// for var in reader {
///     let var = var?;
///     println!("{} is {}", var.name(), var.class());
/// }
/// # Ok::<(), mat5_rs::Error>(())
/// ```
pub struct MatReader<R: Read = BufReader<File>> {
    /// Unconsumed sniffed bytes followed by the rest of the stream.
    inner: Chain<Cursor<Vec<u8>>, R>,

    /// Level 5 header, absent for Level 4 files.
    header: Option<Header>,

    /// Byte order (Level 5 only; Level 4 records it per variable).
    endian: Endian,

    /// Absolute offset of the next unread byte.
    position: u64,

    /// Set once the end of the stream or a fatal error is reached.
    done: bool,

    /// Largest element a compressed variable may inflate to.
    inflate_limit: u64,
}

impl MatReader<BufReader<File>> {
    /// Open a MAT file for reading.
    ///
    /// The header (or the first Level 4 matrix header) is validated before
    /// this returns, so an `Ok` reader is known to be a MAT container.
    ///
    /// # Errors
    ///
    /// - [`Error::OpenFailed`] if the file doesn't exist or isn't readable
    /// - [`Error::NotMatFile`] if the file isn't a MAT container
    /// - [`Error::UnsupportedVersion`] for HDF5-based v7.3 files
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::open_failed(path, e))?;

        let reader = Self::new(BufReader::new(file))?;
        debug!(
            "opened '{}' ({}, {:?})",
            path.display(),
            reader.version(),
            reader.endian
        );
        Ok(reader)
    }
}

impl<R: Read> MatReader<R> {
    /// Start reading a MAT container from any byte stream.
    ///
    /// # Errors
    ///
    /// Same as [`MatReader::open`], minus the file-system errors.
    pub fn new(mut reader: R) -> Result<Self> {
        let mut prefix = Vec::with_capacity(HEADER_LEN);
        (&mut reader)
            .take(HEADER_LEN as u64)
            .read_to_end(&mut prefix)?;

        if prefix.is_empty() {
            return Err(Error::not_mat_file("file is empty"));
        }

        if let Ok(bytes) = <&[u8; HEADER_LEN]>::try_from(prefix.as_slice()) {
            match Header::parse(bytes) {
                Ok(header) => {
                    return Ok(MatReader {
                        inner: Cursor::new(Vec::new()).chain(reader),
                        endian: header.endian(),
                        header: Some(header),
                        position: HEADER_LEN as u64,
                        done: false,
                        inflate_limit: DEFAULT_INFLATE_LIMIT,
                    });
                }
                Err(e @ Error::UnsupportedVersion { .. }) => return Err(e),
                Err(_) => {}
            }
        }

        if V4Header::parse(&prefix).is_some() {
            return Ok(MatReader {
                inner: Cursor::new(prefix).chain(reader),
                header: None,
                endian: Endian::Little,
                position: 0,
                done: false,
                inflate_limit: DEFAULT_INFLATE_LIMIT,
            });
        }

        Err(Error::not_mat_file(
            "no Level 5 header or Level 4 matrix header found",
        ))
    }

    /// Cap the inflated size of each compressed variable.
    ///
    /// A variable whose element would inflate past `limit` bytes fails with
    /// [`Error::InvalidFormat`] before it is decompressed, and reading
    /// continues with the next variable. Defaults to
    /// [`DEFAULT_INFLATE_LIMIT`].
    pub fn with_inflate_limit(mut self, limit: u64) -> Self {
        self.inflate_limit = limit;
        self
    }

    /// The container level.
    pub fn version(&self) -> MatVersion {
        if self.header.is_some() {
            MatVersion::Level5
        } else {
            MatVersion::Level4
        }
    }

    /// The Level 5 header, `None` for Level 4 files.
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// Read the next variable.
    ///
    /// Returns `Ok(None)` once every variable has been read.
    pub fn read_next(&mut self) -> Result<Option<Variable>> {
        if self.done {
            return Ok(None);
        }

        let result = if self.header.is_some() {
            self.next_v5()
        } else {
            self.next_v4()
        };

        if let Ok(None) = result {
            self.done = true;
        }
        result
    }

    fn next_v5(&mut self) -> Result<Option<Variable>> {
        let subsys_offset = self.header.as_ref().map_or(0, Header::subsys_offset);

        loop {
            let offset = self.position;

            let mut tag = [0u8; TAG_LEN];
            if !self.read_exact_or_eof(&mut tag)? {
                return Ok(None);
            }

            let (raw_type, count, small) = parse_tag(&tag, self.endian);
            if small {
                warn!("skipping small top-level element at offset {}", offset);
                continue;
            }

            let count = count as usize;
            let payload = self.read_payload(count)?;
            let data_type = DataType::from_raw(raw_type);

            // Compressed elements are stored back to back without padding.
            if data_type != Some(DataType::Compressed) {
                self.skip(padded_len(count) - count)?;
            }

            if subsys_offset != 0 && offset == subsys_offset {
                debug!("skipping subsystem data at offset {}", offset);
                continue;
            }

            match data_type {
                Some(DataType::Matrix) => {
                    return decode_matrix(&payload, self.endian, 0).map(Some);
                }
                Some(DataType::Compressed) => {
                    return self.decode_compressed(&payload).map(Some);
                }
                _ => {
                    warn!(
                        "skipping top-level element of type {} at offset {}",
                        raw_type, offset
                    );
                }
            }
        }
    }

    fn decode_compressed(&self, payload: &[u8]) -> Result<Variable> {
        let corrupt =
            |e: io::Error| Error::invalid_format(format!("corrupt compressed element: {}", e));
        let mut decoder = ZlibDecoder::new(payload);

        let mut tag = [0u8; TAG_LEN];
        decoder.read_exact(&mut tag).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                Error::invalid_format("compressed element is empty")
            } else {
                corrupt(e)
            }
        })?;

        let (raw_type, count, _) = parse_tag(&tag, self.endian);
        if DataType::from_raw(raw_type) != Some(DataType::Matrix) {
            return Err(Error::invalid_format(format!(
                "compressed element holds type {}, expected miMATRIX",
                raw_type
            )));
        }

        // Inflate no further than the declared length, and only if it fits.
        let total = TAG_LEN as u64 + u64::from(count);
        if total > self.inflate_limit {
            return Err(Error::invalid_format(format!(
                "compressed element inflates to {} bytes, over the {} byte limit",
                total, self.inflate_limit
            )));
        }

        let mut body = Vec::new();
        decoder
            .take(u64::from(count))
            .read_to_end(&mut body)
            .map_err(corrupt)?;
        if body.len() < count as usize {
            return Err(Error::invalid_format("compressed element is truncated"));
        }

        debug!("inflated {} bytes to {}", payload.len(), total);
        decode_matrix(&body, self.endian, 0)
    }

    fn next_v4(&mut self) -> Result<Option<Variable>> {
        let mut raw = [0u8; V4_HEADER_LEN];
        if !self.read_exact_or_eof(&mut raw)? {
            return Ok(None);
        }

        let header = match V4Header::parse(&raw) {
            Some(header) => header,
            None => {
                return self.fatal(Error::invalid_format(format!(
                    "bad Level 4 matrix header at offset {}",
                    self.position - V4_HEADER_LEN as u64
                )))
            }
        };

        let len = match header.payload_len() {
            Some(len) => len,
            None => return self.fatal(Error::invalid_format("Level 4 matrix too large")),
        };

        let payload = self.read_payload(len)?;
        decode_v4(&header, &payload).map(Some)
    }

    /// Fill `buf`, returning `false` on a clean end of stream.
    fn read_exact_or_eof(&mut self, buf: &mut [u8]) -> Result<bool> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) if filled == 0 => return Ok(false),
                Ok(0) => return self.fatal(Error::UnexpectedEof),
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return self.fatal(e.into()),
            }
        }
        self.position += filled as u64;
        Ok(true)
    }

    /// Read exactly `len` bytes of element data.
    fn read_payload(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut payload = Vec::new();
        let read = (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut payload);
        if let Err(e) = read {
            return self.fatal(e.into());
        }

        self.position += payload.len() as u64;
        if payload.len() < len {
            return self.fatal(Error::UnexpectedEof);
        }
        Ok(payload)
    }

    /// Discard up to `len` bytes of padding. A file that ends inside the
    /// padding is not an error; the next read reports end of stream.
    fn skip(&mut self, len: usize) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        let skipped = std::io::copy(
            &mut (&mut self.inner).take(len as u64),
            &mut std::io::sink(),
        );
        match skipped {
            Ok(n) => {
                self.position += n;
                Ok(())
            }
            Err(e) => self.fatal(e.into()),
        }
    }

    /// Stop iteration and report `err`.
    fn fatal<T>(&mut self, err: Error) -> Result<T> {
        self.done = true;
        Err(err)
    }
}

impl<R: Read> Iterator for MatReader<R> {
    type Item = Result<Variable>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

impl<R: Read> fmt::Debug for MatReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatReader")
            .field("version", &self.version())
            .field("endian", &self.endian)
            .field("position", &self.position)
            .field("done", &self.done)
            .finish()
    }
}
