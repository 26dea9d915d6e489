//! PDF parsing module.

mod backend;
mod content;
mod layout;
mod options;
mod pdf_parser;
mod ruling;
mod table_detector;

pub use backend::{
    BackendFontInfo, ContentOp, FormXObject, LopdfBackend, ObjectId, PageId, PdfBackend,
    PdfValue, ResourceScope, DEFAULT_MEDIA_BOX,
};
pub use content::{interpret_page, ContentInterpreter, Matrix, PageObjects, Segment};
pub use layout::{group_into_lines, spans_to_text, Glyph, TextLine, TextSpan};
pub use options::{ErrorMode, ExtractOptions, TableSettings, TableStrategy};
pub use pdf_parser::PdfParser;
pub use ruling::{CellBox, Edge, Orientation, RulingTableFinder};
pub use table_detector::{DetectedRow, DetectedTable, TableDetector, TableDetectorConfig};
