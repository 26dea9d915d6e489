//! Extraction result types and their JSON shape.
//!
//! A successful extraction serializes as `{"data": [...]}`, where each item
//! is either a table (array of rows) or `{"text_content": "..."}`. A failed
//! one serializes as `{"error": "..."}`.

use serde::{Deserialize, Serialize};

use super::Table;

/// One entry of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Item {
    /// A detected table
    Table(Table),
    /// The text of one page
    Text {
        /// Reconstructed page text
        text_content: String,
    },
}

impl Item {
    /// Wrap page text.
    pub fn text(text: impl Into<String>) -> Self {
        Item::Text {
            text_content: text.into(),
        }
    }

    /// Get the table, if this item is one.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Item::Table(table) => Some(table),
            Item::Text { .. } => None,
        }
    }

    /// Get the page text, if this item is a text record.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Item::Text { text_content } => Some(text_content),
            Item::Table(_) => None,
        }
    }
}

/// Outcome of extracting one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionResult {
    /// Items in page order
    #[serde(rename = "data")]
    Data(Vec<Item>),
    /// Human-readable failure message
    #[serde(rename = "error")]
    Error(String),
}

impl ExtractionResult {
    /// Check if this is an error result.
    pub fn is_error(&self) -> bool {
        matches!(self, ExtractionResult::Error(_))
    }

    /// Get the error message, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ExtractionResult::Error(message) => Some(message),
            ExtractionResult::Data(_) => None,
        }
    }

    /// Get the extracted items, if any.
    pub fn items(&self) -> Option<&[Item]> {
        match self {
            ExtractionResult::Data(items) => Some(items),
            ExtractionResult::Error(_) => None,
        }
    }

    /// Iterate over the extracted tables.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.items()
            .unwrap_or_default()
            .iter()
            .filter_map(Item::as_table)
    }

    /// Count the extracted tables (zero for errors).
    pub fn table_count(&self) -> usize {
        self.tables().count()
    }
}

impl From<crate::Result<Vec<Item>>> for ExtractionResult {
    fn from(result: crate::Result<Vec<Item>>) -> Self {
        match result {
            Ok(items) => ExtractionResult::Data(items),
            Err(err) => ExtractionResult::Error(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;

    fn sample() -> ExtractionResult {
        ExtractionResult::Data(vec![
            Item::Table(Table::from_rows(vec![
                vec![Some("a".to_string()), Some("b".to_string())],
                vec![Some("1".to_string()), None],
            ])),
            Item::text("a b\n1"),
        ])
    }

    #[test]
    fn test_data_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({"data": [[["a", "b"], ["1", null]], {"text_content": "a b\n1"}]})
        );
    }

    #[test]
    fn test_error_shape() {
        let result = ExtractionResult::Error("File missing.pdf not found".to_string());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value, json!({"error": "File missing.pdf not found"}));
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_json_round_trip() {
        for result in [sample(), ExtractionResult::Error("boom".to_string())] {
            let text = serde_json::to_string_pretty(&result).unwrap();
            let back: ExtractionResult = serde_json::from_str(&text).unwrap();
            assert_eq!(back, result);
        }
    }

    #[test]
    fn test_from_result_flattens_error_kind() {
        let result: ExtractionResult = Err(Error::Encrypted).into();
        assert_eq!(result.error_message(), Some("Document is encrypted"));
        assert_eq!(result.table_count(), 0);
        assert!(result.items().is_none());
    }

    #[test]
    fn test_accessors() {
        let result = sample();
        assert!(!result.is_error());
        assert_eq!(result.table_count(), 1);
        let items = result.items().unwrap();
        assert_eq!(items[1].as_text(), Some("a b\n1"));
        assert!(items[1].as_table().is_none());
    }
}
