//! PDF header detection.
//!
//! Files are checked for a `%PDF-x.y` marker before the object model is
//! loaded, so that non-PDF input fails with a clear message instead of a
//! cross-reference error.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF format information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
    /// Byte offset of the `%PDF-` marker (non-zero when junk precedes it)
    pub offset: usize,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Readers accept the header anywhere in the first kilobyte.
const HEADER_WINDOW: usize = 1024;

/// Detect PDF format from a file path.
///
/// Only the first kilobyte of the file is read.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PdfFormat> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(HEADER_WINDOW);
    file.take(HEADER_WINDOW as u64).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect PDF format from the leading bytes of a file.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    let window = &data[..data.len().min(HEADER_WINDOW)];

    let offset = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let start = offset + PDF_MAGIC.len();
    let version_bytes = data
        .get(start..start + VERSION_LEN)
        .ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    log::debug!("detected PDF {} at offset {}", version, offset);
    Ok(PdfFormat { version, offset })
}

/// Check a version string of the form `d.d`.
fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Check if a file carries a PDF header.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}
