//! Error types for MAT-file operations.
//!
//! This module provides the [`Error`] enum covering all failure modes when
//! reading or writing MAT containers, along with a convenient [`Result`]
//! type alias.
//!
//! Errors fall into two tiers that callers usually treat differently:
//!
//! - **open errors** ([`Error::is_open_error`]): the input could not be
//!   opened as a MAT container at all. Nothing can be read.
//! - **write errors** ([`Error::is_write_error`]): a single variable was
//!   rejected by the writer. The output is left untouched and later
//!   variables may still be written.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::class::ArrayClass;

/// Result type alias for MAT-file operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during MAT-file operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from the underlying file system.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file could not be opened.
    #[error("Cannot open '{path}': {source}")]
    OpenFailed {
        /// Path to the file that could not be opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The file is not a MAT container of any supported level.
    #[error("Not a MAT file: {reason}")]
    NotMatFile {
        /// Why the header was rejected.
        reason: String,
    },

    /// The file is a MAT container of a version this crate cannot read.
    #[error("Unsupported MAT file version: {version}")]
    UnsupportedVersion {
        /// Human-readable version description.
        version: String,
    },

    /// A data element could not be decoded.
    #[error("Invalid MAT data: {reason}")]
    InvalidFormat {
        /// Description of the format error.
        reason: String,
    },

    /// The stream ended in the middle of a data element.
    #[error("Unexpected end of file")]
    UnexpectedEof,

    /// The variable's class cannot be written to a version 5 container.
    #[error("Variable '{name}': class '{class}' cannot be written")]
    UnsupportedClass {
        /// Variable name.
        name: String,
        /// Offending array class.
        class: ArrayClass,
    },

    /// The variable's data does not agree with its dimensions.
    #[error("Variable '{name}': expected {expected} elements, found {found}")]
    ShapeMismatch {
        /// Variable name.
        name: String,
        /// Element count implied by the dimensions.
        expected: usize,
        /// Element count actually present.
        found: usize,
    },

    /// An encoded element does not fit the 32-bit size field.
    #[error("Variable '{name}': {bytes} bytes exceeds the version 5 element size limit")]
    TooLarge {
        /// Variable name.
        name: String,
        /// Encoded size in bytes.
        bytes: usize,
    },

    /// The writer has already been closed.
    #[error("File has been closed")]
    FileClosed,
}

impl Error {
    /// Create an OpenFailed error for the given path.
    pub fn open_failed(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::OpenFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a NotMatFile error with the given reason.
    pub fn not_mat_file(reason: impl Into<String>) -> Self {
        Self::NotMatFile {
            reason: reason.into(),
        }
    }

    /// Create an UnsupportedVersion error.
    pub fn unsupported_version(version: impl Into<String>) -> Self {
        Self::UnsupportedVersion {
            version: version.into(),
        }
    }

    /// Create an InvalidFormat error with the given reason.
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            reason: reason.into(),
        }
    }

    /// Create an UnsupportedClass error.
    pub fn unsupported_class(name: impl Into<String>, class: ArrayClass) -> Self {
        Self::UnsupportedClass {
            name: name.into(),
            class,
        }
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(name: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            expected,
            found,
        }
    }

    /// Create a TooLarge error.
    pub fn too_large(name: impl Into<String>, bytes: usize) -> Self {
        Self::TooLarge {
            name: name.into(),
            bytes,
        }
    }

    /// Whether this error means the input container could not be opened.
    pub fn is_open_error(&self) -> bool {
        matches!(
            self,
            Error::OpenFailed { .. } | Error::NotMatFile { .. } | Error::UnsupportedVersion { .. }
        )
    }

    /// Whether this error is a per-variable rejection by the writer.
    pub fn is_write_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedClass { .. }
                | Error::ShapeMismatch { .. }
                | Error::TooLarge { .. }
                | Error::Io(_)
                | Error::FileClosed
        )
    }
}
