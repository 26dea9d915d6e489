//! Page-by-page PDF parser producing tables and text.

use std::path::Path;

use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::{Error, Result};
use crate::model::PageContent;

use super::backend::{LopdfBackend, PageId, PdfBackend};
use super::content::interpret_page;
use super::layout::spans_to_text;
use super::options::{ErrorMode, ExtractOptions, TableStrategy};
use super::ruling::RulingTableFinder;
use super::table_detector::TableDetector;

/// PDF document parser.
pub struct PdfParser<B: PdfBackend = LopdfBackend> {
    backend: B,
    options: ExtractOptions,
}

impl PdfParser<LopdfBackend> {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ExtractOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<Self> {
        let path = path.as_ref();
        let format = detect_format_from_path(path)?;
        log::debug!("{}: PDF {}", path.display(), format.version);

        let backend = LopdfBackend::load_file(path)?;
        Ok(Self::with_backend(backend, options))
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ExtractOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ExtractOptions) -> Result<Self> {
        detect_format_from_bytes(data)?;
        let backend = LopdfBackend::load_bytes(data)?;
        Ok(Self::with_backend(backend, options))
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.backend.is_encrypted()
    }

    /// Get PDF version.
    pub fn version(&self) -> String {
        self.backend.version()
    }
}

impl<B: PdfBackend> PdfParser<B> {
    /// Wrap an already loaded backend.
    pub fn with_backend(backend: B, options: ExtractOptions) -> Self {
        Self { backend, options }
    }

    /// Options used for every page.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Get page count.
    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    /// Parse every page in document order.
    pub fn parse(&self) -> Result<Vec<PageContent>> {
        let pages = self.backend.pages();
        let mut parsed = Vec::with_capacity(pages.len());

        for (&number, &id) in &pages {
            match self.parse_page_id(number, id) {
                Ok(page) => parsed.push(page),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping page {}: {}", number, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(parsed)
    }

    /// Parse a single page by its 1-based number.
    pub fn parse_page(&self, number: u32) -> Result<PageContent> {
        let pages = self.backend.pages();
        let id = pages
            .get(&number)
            .copied()
            .ok_or(Error::PageOutOfRange(number, pages.len() as u32))?;
        self.parse_page_id(number, id)
    }

    fn parse_page_id(&self, number: u32, id: PageId) -> Result<PageContent> {
        let [x0, y0, x1, y1] = self.backend.media_box(id);
        let mut page = PageContent::new(number, (x1 - x0).abs(), (y1 - y0).abs());

        let objects = interpret_page(&self.backend, id)?;

        let settings = &self.options.tables;
        let tables = match settings.strategy {
            TableStrategy::Lines => RulingTableFinder::new(settings.clone())
                .extract(&objects.segments, &objects.spans),
            TableStrategy::Text => {
                TableDetector::with_config(settings.text.clone()).extract(&objects.spans)
            }
        };
        log::debug!("page {}: {} tables", number, tables.len());

        for table in tables {
            if self.options.drop_empty_rows {
                page.add_table(table.without_empty_rows());
            } else {
                page.add_table(table);
            }
        }

        if self.options.include_text {
            page.set_text(spans_to_text(objects.spans));
        }

        Ok(page)
    }
}
