//! Single-file extraction.
//!
//! The `extract_*` functions never fail: every error is flattened into
//! [`ExtractionResult::Error`] carrying its message. [`extract_items`] is
//! the fallible core for callers that need the error kind.

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{ExtractionResult, Item, PageContent};
use crate::parser::{ExtractOptions, PdfParser};

/// Extract tables and page text from a PDF file.
///
/// # Example
///
/// ```no_run
/// use pftables::extract_tables_from_pdf;
///
/// let result = extract_tables_from_pdf("statement.pdf");
/// if let Some(message) = result.error_message() {
///     eprintln!("{}", message);
/// }
/// ```
pub fn extract_tables_from_pdf<P: AsRef<Path>>(path: P) -> ExtractionResult {
    extract_with_options(path, &ExtractOptions::single())
}

/// Extract from a PDF file with custom options.
pub fn extract_with_options<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> ExtractionResult {
    let path = path.as_ref();
    let result = extract_items(path, options);
    if let Err(e) = &result {
        log::warn!("{}: {}", path.display(), e);
    }
    result.into()
}

/// Extract output items from a PDF file, keeping the error kind.
pub fn extract_items<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<Vec<Item>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let parser = PdfParser::open_with_options(path, options.clone())?;
    log::debug!("{}: {} pages", path.display(), parser.page_count());

    let pages = parser.parse()?;
    let items = collect_items(pages);
    log::info!("{}: {} items extracted", path.display(), items.len());
    Ok(items)
}

/// Extract from an in-memory PDF.
pub fn extract_bytes(data: &[u8], options: &ExtractOptions) -> ExtractionResult {
    let result = PdfParser::from_bytes_with_options(data, options.clone())
        .and_then(|parser| parser.parse())
        .map(collect_items);
    if let Err(e) = &result {
        log::warn!("in-memory PDF: {}", e);
    }
    result.into()
}

/// Per page in order: its tables, then its text record.
fn collect_items(pages: Vec<PageContent>) -> Vec<Item> {
    pages.into_iter().flat_map(PageContent::into_items).collect()
}
