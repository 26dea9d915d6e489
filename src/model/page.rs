//! Page-level types.

use super::{Item, Table};

/// Content extracted from a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Detected tables, top to bottom
    pub tables: Vec<Table>,

    /// Reconstructed page text, `None` when the page has no text
    pub text: Option<String>,
}

impl PageContent {
    /// Create an empty page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            tables: Vec::new(),
            text: None,
        }
    }

    /// Create an empty page with standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Add a table to the page.
    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Set the page text; whitespace-only text is treated as absent.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.text = if text.trim().is_empty() {
            None
        } else {
            Some(text)
        };
    }

    /// Check if the page produced neither tables nor text.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.text.is_none()
    }

    /// Flatten into output items: tables first, then the text record.
    pub fn into_items(self) -> impl Iterator<Item = Item> {
        self.tables
            .into_iter()
            .map(Item::Table)
            .chain(self.text.map(Item::text))
    }
}
