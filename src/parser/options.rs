//! Extraction options and configuration.

use super::table_detector::TableDetectorConfig;

/// How tables are located on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableStrategy {
    /// Cells are delimited by ruling lines and rectangle edges
    #[default]
    Lines,
    /// Cells are inferred from text alignment alone
    Text,
}

/// What to do when a single page cannot be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail the whole document
    #[default]
    Strict,
    /// Log a warning and skip the page
    Lenient,
}

/// Tuning for table finding.
#[derive(Debug, Clone)]
pub struct TableSettings {
    /// Which finder to run
    pub strategy: TableStrategy,

    /// Parallel edges closer than this (points) snap to one position
    pub snap_tolerance: f32,

    /// Collinear edges with gaps up to this (points) are joined
    pub join_tolerance: f32,

    /// Edges shorter than this (points) are ignored
    pub edge_min_length: f32,

    /// Slack (points) when testing whether two edges cross
    pub intersection_tolerance: f32,

    /// Minimum cells for a ruled grid to count as a table
    pub min_cells: usize,

    /// Parameters for the text-alignment finder
    pub text: TableDetectorConfig,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            strategy: TableStrategy::Lines,
            snap_tolerance: 3.0,
            join_tolerance: 3.0,
            edge_min_length: 3.0,
            intersection_tolerance: 3.0,
            min_cells: 2,
            text: TableDetectorConfig::default(),
        }
    }
}

/// Options for extracting content from PDF documents.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Whether to emit a text record per page
    pub include_text: bool,

    /// Whether to remove table rows whose cells are all null or empty
    pub drop_empty_rows: bool,

    /// Table finding configuration
    pub tables: TableSettings,

    /// Page failure handling
    pub error_mode: ErrorMode,
}

impl ExtractOptions {
    /// Create new options with defaults (tables and text, rows untouched).
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for single-file extraction: tables plus page text.
    pub fn single() -> Self {
        Self::default()
    }

    /// Options for batch extraction: tables only, fully empty rows removed.
    pub fn batch() -> Self {
        Self::default().with_text(false).with_empty_rows_dropped(true)
    }

    /// Enable or disable page text records.
    pub fn with_text(mut self, include: bool) -> Self {
        self.include_text = include;
        self
    }

    /// Enable or disable removal of fully empty rows.
    pub fn with_empty_rows_dropped(mut self, drop: bool) -> Self {
        self.drop_empty_rows = drop;
        self
    }

    /// Set the table finding strategy.
    pub fn with_strategy(mut self, strategy: TableStrategy) -> Self {
        self.tables.strategy = strategy;
        self
    }

    /// Set how page failures are handled.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Replace the table settings.
    pub fn with_table_settings(mut self, settings: TableSettings) -> Self {
        self.tables = settings;
        self
    }

    /// Current table settings.
    pub fn table_settings(&self) -> &TableSettings {
        &self.tables
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_text: true,
            drop_empty_rows: false,
            tables: TableSettings::default(),
            error_mode: ErrorMode::Strict,
        }
    }
}
