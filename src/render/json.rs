//! JSON rendering for extraction results.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with two-space indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a value to a JSON string.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(json)
}

/// Serialize a value as JSON into a file, replacing any existing content.
pub fn write_json<T, P>(path: P, value: &T, format: JsonFormat) -> Result<()>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);

    match format {
        JsonFormat::Pretty => serde_json::to_writer_pretty(&mut writer, value)?,
        JsonFormat::Compact => serde_json::to_writer(&mut writer, value)?,
    }

    writer.flush()?;
    log::debug!("wrote {}", path.display());
    Ok(())
}
