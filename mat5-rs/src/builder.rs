//! Builder for creating version 5 MAT files.
//!
//! # Example
//!
//! ```no_run
//! use mat5_rs::{MatWriter, Variable};
//!
//! let mut writer = MatWriter::builder()
//!     .header_text("Converted by my-app")
//!     .create("output.mat")?;
//!
//! writer.write(&Variable::double("x", vec![1, 1], vec![42.0]))?;
//! writer.close()?;
//! # Ok::<(), mat5_rs::Error>(())
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::header::Header;
use crate::writer::MatWriter;

/// Builder for [`MatWriter`].
///
/// The header text defaults to [`Header::default_text()`], which records
/// the platform, this crate and the creation time.
#[derive(Debug, Default, Clone)]
pub struct MatWriterBuilder {
    /// Descriptive header text, `None` for the default.
    header_text: Option<String>,
}

impl MatWriterBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the descriptive header text.
    ///
    /// Text longer than 116 bytes is truncated when written.
    pub fn header_text(mut self, text: impl Into<String>) -> Self {
        self.header_text = Some(text.into());
        self
    }

    /// The header this builder will write.
    pub fn header(&self) -> Header {
        match &self.header_text {
            Some(text) => Header::new(text.clone()),
            None => Header::default(),
        }
    }

    /// Create (or truncate) the file at `path` and write the header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the parent directory does not exist or the
    /// file cannot be created or written.
    pub fn create(self, path: impl AsRef<Path>) -> Result<MatWriter> {
        let path = path.as_ref().to_path_buf();

        // Validate path is writable (parent directory exists)
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Parent directory does not exist: {}", parent.display()),
                )));
            }
        }

        let file = File::create(&path).map_err(|e| {
            Error::Io(io::Error::new(
                e.kind(),
                format!("Cannot create '{}': {}", path.display(), e),
            ))
        })?;

        debug!("created '{}'", path.display());
        Ok(MatWriter::new(BufWriter::new(file), &self.header())?.with_path(path))
    }

    /// Write the header to an arbitrary sink.
    pub fn build<W: Write>(self, inner: W) -> Result<MatWriter<W>> {
        MatWriter::new(inner, &self.header())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_default_header() {
        let header = MatWriterBuilder::new().header();
        assert!(header.text().starts_with("MATLAB 5.0 MAT-file"));
    }

    #[test]
    fn test_builder_custom_header() {
        let writer = MatWriterBuilder::new()
            .header_text("custom text")
            .build(Vec::new())
            .unwrap();
        let bytes = writer.into_inner().unwrap();
        assert!(bytes.starts_with(b"custom text "));
    }

    #[test]
    fn test_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.mat");
        let err = MatWriterBuilder::new().create(&path).unwrap_err();
        assert!(err.to_string().contains("Parent directory does not exist"));
        assert!(!path.exists());
    }
}
