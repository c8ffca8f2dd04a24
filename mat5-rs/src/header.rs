//! The 128-byte Level 5 file header.
//!
//! ```text
//! offset  size  field
//!      0   116  descriptive text, space padded
//!    116     8  subsystem data offset (zeros or spaces when absent)
//!    124     2  version (0x0100 for Level 5, 0x0200 for HDF5-based v7.3)
//!    126     2  endian indicator, "IM" little-endian or "MI" big-endian
//! ```

use crate::endian::{Endian, Primitive};
use crate::error::{Error, Result};

/// Total header size in bytes.
pub const HEADER_LEN: usize = 128;

/// Size of the descriptive text field.
pub const TEXT_LEN: usize = 116;

/// Version number of Level 5 containers.
pub const VERSION_5: u16 = 0x0100;

/// Version number of HDF5-based v7.3 containers.
pub const VERSION_73: u16 = 0x0200;

/// A parsed or to-be-written Level 5 header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    text: String,
    subsys_offset: u64,
    version: u16,
    endian: Endian,
}

impl Header {
    /// Create a little-endian version 5 header with the given text.
    ///
    /// Text longer than 116 bytes is truncated at a character boundary
    /// when written.
    pub fn new(text: impl Into<String>) -> Self {
        Header {
            text: text.into(),
            subsys_offset: 0,
            version: VERSION_5,
            endian: Endian::Little,
        }
    }

    /// The text written when no custom header text is given.
    pub fn default_text() -> String {
        format!(
            "MATLAB 5.0 MAT-file, Platform: {}-{}, Created by: mat5-rs v{} on {}",
            std::env::consts::OS,
            std::env::consts::ARCH,
            env!("CARGO_PKG_VERSION"),
            chrono::Local::now().format("%a %b %e %H:%M:%S %Y"),
        )
    }

    /// Parse a header from the first 128 bytes of a file.
    ///
    /// # Errors
    ///
    /// - [`Error::NotMatFile`] if the endian indicator is missing
    /// - [`Error::UnsupportedVersion`] for v7.3 or unknown versions
    pub fn parse(bytes: &[u8; HEADER_LEN]) -> Result<Self> {
        let endian = match &bytes[126..128] {
            b"IM" => Endian::Little,
            b"MI" => Endian::Big,
            other => {
                return Err(Error::not_mat_file(format!(
                    "bad endian indicator {:?}",
                    String::from_utf8_lossy(other)
                )))
            }
        };

        let version = endian.u16(&bytes[124..126]);
        match version {
            VERSION_5 => {}
            VERSION_73 => return Err(Error::unsupported_version("7.3 (HDF5-based)")),
            other => return Err(Error::unsupported_version(format!("0x{:04x}", other))),
        }

        let text = String::from_utf8_lossy(&bytes[..TEXT_LEN])
            .trim_end_matches(|c| c == ' ' || c == '\0')
            .to_string();

        let subsys = &bytes[TEXT_LEN..124];
        let subsys_offset = if subsys.iter().all(|&b| b == b' ' || b == 0) {
            0
        } else {
            u64::from_bytes(subsys, endian)
        };

        Ok(Header {
            text,
            subsys_offset,
            version,
            endian,
        })
    }

    /// Encode the header.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [b' '; HEADER_LEN];

        let mut end = self.text.len().min(TEXT_LEN);
        while !self.text.is_char_boundary(end) {
            end -= 1;
        }
        bytes[..end].copy_from_slice(&self.text.as_bytes()[..end]);

        let (subsys, version, indicator) = match self.endian {
            Endian::Little => (
                self.subsys_offset.to_le_bytes(),
                self.version.to_le_bytes(),
                *b"IM",
            ),
            Endian::Big => (
                self.subsys_offset.to_be_bytes(),
                self.version.to_be_bytes(),
                *b"MI",
            ),
        };
        bytes[TEXT_LEN..124].copy_from_slice(&subsys);
        bytes[124..126].copy_from_slice(&version);
        bytes[126..128].copy_from_slice(&indicator);

        bytes
    }

    /// Descriptive text with trailing padding removed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// File offset of the subsystem data element, 0 when absent.
    pub fn subsys_offset(&self) -> u64 {
        self.subsys_offset
    }

    /// Version field.
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Byte order of the file.
    pub fn endian(&self) -> Endian {
        self.endian
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new(Self::default_text())
    }
}
