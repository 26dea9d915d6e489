//! Table types.

use serde::{Deserialize, Serialize};

/// A single table cell: `None` when the cell holds no text.
pub type Cell = Option<String>;

/// An extracted table, serialized as an array of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    /// Rows in the table, top to bottom
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from raw row data.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = Cell>,
    {
        Self {
            rows: rows.into_iter().map(Row::from_cells).collect(),
        }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (widest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Remove rows where every cell is null or empty.
    ///
    /// Surviving rows keep their order and contents.
    pub fn drop_empty_rows(&mut self) {
        self.rows.retain(|row| !row.is_empty());
    }

    /// Consume the table, returning it without fully empty rows.
    pub fn without_empty_rows(mut self) -> Self {
        self.drop_empty_rows();
        self
    }
}

/// A table row, serialized as an array of cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    /// Cells in the row, left to right
    pub cells: Vec<Cell>,
}

impl Row {
    /// Create a new row with cells.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Build a row from any cell iterator.
    pub fn from_cells<C: IntoIterator<Item = Cell>>(cells: C) -> Self {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    /// True when no cell carries non-empty text.
    ///
    /// A row without cells counts as empty.
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|cell| cell.as_deref().map_or(true, str::is_empty))
    }

    /// Get the number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }
}
