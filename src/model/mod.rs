//! Output model for extracted PDF content.
//!
//! These types are what the extractor hands back and what gets written as
//! JSON: tables of nullable cells, per-page content, per-document results
//! and aggregated batch reports.

mod page;
mod report;
mod result;
mod table;

pub use page::PageContent;
pub use report::BatchReport;
pub use result::{ExtractionResult, Item};
pub use table::{Cell, Row, Table};
