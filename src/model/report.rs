//! Aggregated results of a batch run.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ExtractionResult;

/// Per-file results keyed by file name, in input order.
///
/// Serializes as a JSON object whose keys follow insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    entries: Vec<(String, ExtractionResult)>,
}

impl BatchReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result for a file, replacing an earlier entry of the same name.
    pub fn insert(&mut self, file: impl Into<String>, result: ExtractionResult) {
        let file = file.into();
        match self.entries.iter_mut().find(|(name, _)| *name == file) {
            Some(entry) => entry.1 = result,
            None => self.entries.push((file, result)),
        }
    }

    /// Look up the result for a file.
    pub fn get(&self, file: &str) -> Option<&ExtractionResult> {
        self.entries
            .iter()
            .find(|(name, _)| name == file)
            .map(|(_, result)| result)
    }

    /// Iterate entries in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtractionResult)> {
        self.entries
            .iter()
            .map(|(name, result)| (name.as_str(), result))
    }

    /// Number of files in the report.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the report is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of files whose extraction failed.
    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|(_, r)| r.is_error()).count()
    }
}

impl Serialize for BatchReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, result) in &self.entries {
            map.serialize_entry(name, result)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BatchReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ReportVisitor;

        impl<'de> Visitor<'de> for ReportVisitor {
            type Value = BatchReport;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of file names to extraction results")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<BatchReport, A::Error> {
                let mut report = BatchReport::new();
                while let Some((name, result)) =
                    access.next_entry::<String, ExtractionResult>()?
                {
                    report.insert(name, result);
                }
                Ok(report)
            }
        }

        deserializer.deserialize_map(ReportVisitor)
    }
}
