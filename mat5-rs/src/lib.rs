//! # mat5-rs
//!
//! Pure Rust reading and writing of MATLAB MAT files.
//!
//! The reader accepts Level 4 files and Level 5 (version 5, 6 and 7)
//! files in either byte order, including zlib-compressed variables. The
//! writer always produces uncompressed little-endian version 5 files,
//! which every MAT reader understands.
//!
//! HDF5-based v7.3 files are detected and rejected with
//! [`Error::UnsupportedVersion`].
//!
//! ## Quick Start
//!
//! ### Reading MAT Files
//!
//! ```no_run
//! use mat5_rs::{MatReader, Result};
//!
//! fn main() -> Result<()> {
//!     let reader = MatReader::open("data.mat")?;
//!     println!("{} container", reader.version());
//!
//!     for var in reader {
//!         let var = var?;
//!         println!("{}: {}", var.name(), var.describe());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Converting to Version 5
//!
//! ```no_run
//! use mat5_rs::{MatReader, MatWriter, Result};
//!
//! fn main() -> Result<()> {
//!     let mut reader = MatReader::open("compressed.mat")?;
//!     let mut writer = MatWriter::create("plain.mat")?;
//!
//!     while let Some(var) = reader.read_next()? {
//!         if let Err(e) = writer.write(&var) {
//!             eprintln!("skipping {}: {}", var.name(), e);
//!         }
//!     }
//!
//!     writer.close()
//! }
//! ```
//!
//! ### With ndarray (optional feature)
//!
//! ```no_run
//! # #[cfg(feature = "ndarray")]
//! use mat5_rs::{MatReader, Result};
//!
//! # #[cfg(feature = "ndarray")]
//! fn example() -> Result<()> {
//!     for var in MatReader::open("data.mat")? {
//!         let var = var?;
//!         if var.class().is_numeric() {
//!             let array = var.to_array_f64()?;
//!             println!("{}: shape {:?}", var.name(), array.shape());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Classes
//!
//! | Class | Read | Write |
//! |-------|------|-------|
//! | numeric (all ten types), logical | yes | yes |
//! | char | yes | yes (UTF-16) |
//! | cell, struct, object | yes | yes |
//! | sparse | yes | yes |
//! | function handle, opaque | as raw bytes | no |
//!
//! ## Feature Flags
//!
//! - `ndarray`: Enable `ndarray` integration for numeric data access

#![deny(missing_docs)]

// Modules
mod builder;
mod class;
mod data_type;
mod decode;
mod element;
mod encode;
mod endian;
mod error;
mod header;
mod numeric;
mod reader;
mod v4;
mod variable;
mod writer;

// Public exports
pub use builder::MatWriterBuilder;
pub use class::ArrayClass;
pub use data_type::DataType;
pub use encode::encode_variable;
pub use endian::Endian;
pub use error::{Error, Result};
pub use header::{Header, HEADER_LEN};
pub use numeric::{NumericArray, NumericData};
pub use reader::{MatReader, MatVersion, DEFAULT_INFLATE_LIMIT};
pub use variable::{OpaqueArray, SparseMatrix, StructArray, Value, Variable};
pub use writer::MatWriter;

// Conditional re-exports
#[cfg(feature = "ndarray")]
pub use ndarray;
