//! # pftables
//!
//! Table and text extraction from PDF documents to JSON.
//!
//! Each page is interpreted into positioned text spans and ruling
//! segments. Tables are found from the ruling grid (or from text alignment
//! when requested) and the page text is rebuilt line by line. Results are
//! flat JSON: `{"data": [...]}` with tables and `{"text_content": ...}`
//! records, or `{"error": "..."}`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pftables::{extract_tables_from_pdf, render};
//!
//! fn main() -> pftables::Result<()> {
//!     let result = extract_tables_from_pdf("statement.pdf");
//!     println!("{}", render::to_json(&result, render::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Batch
//!
//! ```no_run
//! use pftables::{BatchEvent, BatchExtractor};
//!
//! let report = BatchExtractor::default().run_and_write(|event| {
//!     if let BatchEvent::Started { file } = event {
//!         println!("Extracting {}...", file);
//!     }
//! })?;
//! println!("{} files, {} failed", report.len(), report.error_count());
//! # Ok::<(), pftables::Error>(())
//! ```

pub mod batch;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod parser;
pub mod render;

pub use batch::{BatchEvent, BatchExtractor, DEFAULT_FILES, DEFAULT_OUTPUT};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use extract::{extract_bytes, extract_items, extract_tables_from_pdf, extract_with_options};
pub use model::{BatchReport, Cell, ExtractionResult, Item, PageContent, Row, Table};
pub use parser::{ErrorMode, ExtractOptions, PdfParser, TableSettings, TableStrategy};
pub use render::JsonFormat;

use std::path::Path;

/// Parse a PDF file into per-page content.
///
/// # Example
///
/// ```no_run
/// let pages = pftables::parse_file("statement.pdf").unwrap();
/// for page in &pages {
///     println!("page {}: {} tables", page.number, page.tables.len());
/// }
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<PageContent>> {
    PdfParser::open(path)?.parse()
}

/// Parse a PDF from bytes into per-page content.
pub fn parse_bytes(data: &[u8]) -> Result<Vec<PageContent>> {
    PdfParser::from_bytes(data)?.parse()
}

/// Extract a PDF file and render the result as JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    render::to_json(&extract_tables_from_pdf(path), format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bytes_empty_data() {
        assert!(parse_bytes(&[]).is_err());
    }

    #[test]
    fn test_parse_bytes_too_short() {
        assert!(matches!(parse_bytes(b"%PDF"), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_parse_bytes_unknown_magic() {
        let data = [0xFF, 0xFE, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        assert!(parse_bytes(&data).is_err());
    }

    #[test]
    fn test_parse_file_missing() {
        assert!(matches!(parse_file("missing.pdf"), Err(Error::Io(_))));
    }

    #[test]
    fn test_to_json_missing_file() {
        let json = to_json("missing.pdf", JsonFormat::Pretty).unwrap();
        assert_eq!(json, "{\n  \"error\": \"File missing.pdf not found\"\n}");
    }

    #[test]
    fn test_option_presets() {
        assert!(ExtractOptions::single().include_text);
        assert!(ExtractOptions::batch().drop_empty_rows);
        assert_eq!(TableStrategy::default(), TableStrategy::Lines);
    }
}
