//! Version 5 MAT file writer.
//!
//! `MatWriter` is obtained from [`MatWriterBuilder::create()`] or
//! [`MatWriter::new()`] and appends one uncompressed miMATRIX element per
//! variable after the 128-byte header.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::builder::MatWriterBuilder;
use crate::encode::encode_variable;
use crate::error::{Error, Result};
use crate::header::Header;
use crate::variable::Variable;

/// Active writer for a version 5 MAT file.
///
/// Each variable is encoded in full before any byte reaches the sink, so a
/// variable that cannot be written leaves the output exactly as it was.
///
/// # Example
///
/// ```no_run
/// use mat5_rs::{MatWriter, Variable};
///
/// let mut writer = MatWriter::builder().create("output.mat")?;
/// writer.write(&Variable::double("x", vec![1, 3], vec![1.0, 2.0, 3.0]))?;
/// writer.write(&Variable::text("label", "hello"))?;
/// writer.close()?;
/// # Ok::<(), mat5_rs::Error>(())
/// ```
pub struct MatWriter<W: Write = BufWriter<File>> {
    /// The sink, `None` once closed.
    inner: Option<W>,

    /// Path to the file, if created from one.
    path: Option<PathBuf>,

    /// Count of variables written.
    written: usize,

    /// Run after the final flush. Set for files so close reaches the disk.
    sync_on_close: Option<fn(&mut W) -> io::Result<()>>,
}

impl MatWriter {
    /// Start building a writer for a file on disk.
    pub fn builder() -> MatWriterBuilder {
        MatWriterBuilder::new()
    }

    /// Create a file with a default header.
    ///
    /// Shorthand for `MatWriter::builder().create(path)`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        MatWriterBuilder::new().create(path)
    }

    /// Get the file path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self.sync_on_close = Some(|inner: &mut BufWriter<File>| inner.get_ref().sync_all());
        self
    }
}

impl<W: Write> MatWriter<W> {
    /// Wrap a sink and write the file header to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the header cannot be written.
    ///
    /// # Example
    ///
    /// ```
    /// use mat5_rs::{Header, MatWriter};
    ///
    /// let writer = MatWriter::new(Vec::new(), &Header::new("scratch"))?;
    /// assert_eq!(writer.into_inner()?.len(), 128);
    /// # Ok::<(), mat5_rs::Error>(())
    /// ```
    pub fn new(mut inner: W, header: &Header) -> Result<Self> {
        inner.write_all(&header.to_bytes())?;
        Ok(MatWriter {
            inner: Some(inner),
            path: None,
            written: 0,
            sync_on_close: None,
        })
    }

    /// Write one variable.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedClass`], [`Error::ShapeMismatch`] or
    ///   [`Error::TooLarge`] if the variable cannot be encoded. Nothing is
    ///   written and the writer remains usable.
    /// - [`Error::Io`] if the sink fails
    /// - [`Error::FileClosed`] if the writer has been closed
    pub fn write(&mut self, var: &Variable) -> Result<()> {
        let inner = self.inner.as_mut().ok_or(Error::FileClosed)?;

        let bytes = encode_variable(var)?;
        inner.write_all(&bytes)?;

        self.written += 1;
        debug!("wrote '{}' ({}, {} bytes)", var.name(), var.describe(), bytes.len());
        Ok(())
    }

    /// Get the number of variables written so far.
    pub fn variables_written(&self) -> usize {
        self.written
    }

    /// Flush buffered output to the sink.
    pub fn flush(&mut self) -> Result<()> {
        let inner = self.inner.as_mut().ok_or(Error::FileClosed)?;
        inner.flush()?;
        Ok(())
    }

    /// Flush and return the sink.
    pub fn into_inner(mut self) -> Result<W> {
        let mut inner = self.inner.take().ok_or(Error::FileClosed)?;
        inner.flush()?;
        Ok(inner)
    }

    /// Flush and close the writer. A file on disk is also synced.
    ///
    /// Dropping the writer also closes it, but ignores errors.
    pub fn close(mut self) -> Result<()> {
        self.do_close()
    }

    fn do_close(&mut self) -> Result<()> {
        match self.inner.take() {
            Some(mut inner) => {
                inner.flush()?;
                if let Some(sync) = self.sync_on_close {
                    sync(&mut inner)?;
                }
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl<W: Write> Drop for MatWriter<W> {
    fn drop(&mut self) {
        if let Err(e) = self.do_close() {
            warn!("error closing MAT writer: {}", e);
        }
    }
}

impl<W: Write> fmt::Debug for MatWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatWriter")
            .field("path", &self.path)
            .field("written", &self.written)
            .field("closed", &self.inner.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ArrayClass;
    use crate::header::HEADER_LEN;
    use crate::variable::{OpaqueArray, Value};

    fn opaque(name: &str) -> Variable {
        Variable::new(
            name,
            vec![1, 1],
            Value::Opaque(OpaqueArray {
                class: ArrayClass::Function,
                payload: Vec::new(),
            }),
        )
    }

    #[test]
    fn test_header_written_on_new() {
        let writer = MatWriter::new(Vec::new(), &Header::new("test")).unwrap();
        let bytes = writer.into_inner().unwrap();
        assert_eq!(bytes.len(), HEADER_LEN);
        assert!(bytes.starts_with(b"test"));
        assert_eq!(&bytes[126..128], b"IM");
    }

    #[test]
    fn test_write_counts_variables() {
        let mut writer = MatWriter::new(Vec::new(), &Header::default()).unwrap();
        writer.write(&Variable::double("a", vec![1, 1], vec![1.0])).unwrap();
        writer.write(&Variable::text("b", "hi")).unwrap();
        assert_eq!(writer.variables_written(), 2);
    }

    #[test]
    fn test_rejected_variable_leaves_output_unchanged() {
        let mut writer = MatWriter::new(Vec::new(), &Header::default()).unwrap();
        writer.write(&Variable::double("a", vec![1, 1], vec![1.0])).unwrap();

        let err = writer.write(&opaque("fh")).unwrap_err();
        assert!(err.is_write_error());
        assert_eq!(writer.variables_written(), 1);

        let bytes = writer.into_inner().unwrap();
        let expected = HEADER_LEN
            + encode_variable(&Variable::double("a", vec![1, 1], vec![1.0]))
                .unwrap()
                .len();
        assert_eq!(bytes.len(), expected);
    }

    #[test]
    fn test_writer_usable_after_rejection() {
        let mut writer = MatWriter::new(Vec::new(), &Header::default()).unwrap();
        assert!(writer.write(&opaque("fh")).is_err());
        writer.write(&Variable::double("c", vec![1, 1], vec![3.0])).unwrap();
        assert_eq!(writer.variables_written(), 1);
    }

    #[test]
    fn test_close_flushes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mat");

        let mut writer = MatWriter::create(&path).unwrap();
        assert_eq!(writer.path(), Some(path.as_path()));
        writer.write(&Variable::double("x", vec![1, 1], vec![1.0])).unwrap();
        writer.close().unwrap();

        let len = std::fs::metadata(&path).unwrap().len() as usize;
        assert!(len > HEADER_LEN);
    }

    #[test]
    fn test_only_files_sync_on_close() {
        let dir = tempfile::tempdir().unwrap();
        let file = MatWriter::create(dir.path().join("out.mat")).unwrap();
        assert!(file.sync_on_close.is_some());
        file.close().unwrap();

        let memory = MatWriter::new(Vec::new(), &Header::default()).unwrap();
        assert!(memory.sync_on_close.is_none());
        memory.close().unwrap();
    }
}
