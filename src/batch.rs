//! Batch extraction over a fixed list of files.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::extract::extract_with_options;
use crate::model::BatchReport;
use crate::parser::ExtractOptions;
use crate::render::{write_json, JsonFormat};

/// Files processed by a default batch run, in output order.
pub const DEFAULT_FILES: [&str; 5] = [
    "BGBNG00233900000104179_2021.pdf",
    "BGBNG00233900000104179_2022.pdf",
    "BGBNG00233900000104179_2023.pdf",
    "BGBNG00233900000104179_2024.pdf",
    "BGBNG00233900000104179_2025.pdf",
];

/// Output file of a default batch run.
pub const DEFAULT_OUTPUT: &str = "pf_data_all.json";

/// Progress notifications from a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchEvent<'a> {
    /// About to extract `file`
    Started { file: &'a str },
    /// Finished `file`; `ok` is false when its result is an error
    Finished { file: &'a str, ok: bool },
}

/// Extracts a list of files into one report.
///
/// Files are resolved relative to the working directory and reported under
/// the name they were given.
#[derive(Debug, Clone)]
pub struct BatchExtractor {
    files: Vec<String>,
    output: PathBuf,
    options: ExtractOptions,
}

impl BatchExtractor {
    /// Create a batch over the given files, with batch options and the
    /// default output path.
    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            options: ExtractOptions::batch(),
        }
    }

    /// Set the output file.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    /// Replace the extraction options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Files to extract, in report order.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Where [`run_and_write`](Self::run_and_write) writes the report.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Extract every file in order. A failing file is recorded and the run
    /// continues.
    pub fn run<F>(&self, mut on_progress: F) -> BatchReport
    where
        F: FnMut(BatchEvent<'_>),
    {
        let mut report = BatchReport::new();

        for file in &self.files {
            on_progress(BatchEvent::Started { file });
            let result = extract_with_options(file, &self.options);
            on_progress(BatchEvent::Finished {
                file,
                ok: !result.is_error(),
            });
            report.insert(file.as_str(), result);
        }

        log::info!(
            "batch: {} files, {} failed",
            report.len(),
            report.error_count()
        );
        report
    }

    /// Run the batch and write the report as pretty JSON to the output file.
    pub fn run_and_write<F>(&self, on_progress: F) -> Result<BatchReport>
    where
        F: FnMut(BatchEvent<'_>),
    {
        let report = self.run(on_progress);
        write_json(&self.output, &report, JsonFormat::Pretty)?;
        Ok(report)
    }
}

impl Default for BatchExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_FILES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_batch() {
        let batch = BatchExtractor::default();
        assert_eq!(batch.files().len(), 5);
        assert_eq!(batch.files()[0], "BGBNG00233900000104179_2021.pdf");
        assert_eq!(batch.files()[4], "BGBNG00233900000104179_2025.pdf");
        assert_eq!(batch.output(), Path::new("pf_data_all.json"));
    }

    #[test]
    fn test_missing_files_recorded_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf").display().to_string();
        let b = dir.path().join("b.pdf").display().to_string();

        let mut events = Vec::new();
        let report = BatchExtractor::new([a.clone(), b.clone()]).run(|event| {
            events.push(match event {
                BatchEvent::Started { file } => format!("start {}", file),
                BatchEvent::Finished { file, ok } => format!("done {} {}", file, ok),
            })
        });

        assert_eq!(
            events,
            vec![
                format!("start {}", a),
                format!("done {} false", a),
                format!("start {}", b),
                format!("done {} false", b),
            ]
        );
        let keys: Vec<&str> = report.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![a.as_str(), b.as_str()]);
        assert_eq!(report.error_count(), 2);
        assert_eq!(
            report.get(&a).and_then(|r| r.error_message()).map(str::to_string),
            Some(format!("File {} not found", a))
        );
    }

    #[test]
    fn test_run_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.json");

        let report = BatchExtractor::new(["missing.pdf"])
            .with_output(&output)
            .run_and_write(|_| {})
            .unwrap();
        assert_eq!(report.len(), 1);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(
            written,
            serde_json::json!({"missing.pdf": {"error": "File missing.pdf not found"}})
        );
    }

    #[test]
    fn test_unwritable_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing-dir").join("report.json");

        let result = BatchExtractor::new(Vec::<String>::new())
            .with_output(output)
            .run_and_write(|_| {});
        assert!(result.is_err());
    }
}
