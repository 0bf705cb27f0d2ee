//! Format adapters.
//!
//! CSV and JSON implement [`ImportSource`]; Parquet is the backup file
//! format and is read and written by the backup service.

pub mod csv;
pub mod json;
pub mod parquet;

use crate::models::EntityKind;
use crate::{Error, Result};
use serde::Serialize;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use super::traits::ImportSource;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Headerless delimited text, columns in the kind's field order.
    Csv,
    /// A JSON array of objects.
    Json,
    /// Apache Parquet columnar format (backup files only).
    Parquet,
}

impl Format {
    /// Returns the formats records can be imported from.
    #[must_use]
    pub const fn import_formats() -> &'static [Self] {
        &[Self::Csv, Self::Json]
    }

    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Parquet => "parquet",
        }
    }

    /// Detects format from file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not recognized.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match ext.as_deref() {
            Some(ext) => ext.parse(),
            None => Err(Error::InvalidInput(format!(
                "cannot determine format of {}: file has no extension",
                path.display()
            ))),
        }
    }

    /// Returns whether records can be imported from this format.
    #[must_use]
    pub const fn supports_import(&self) -> bool {
        matches!(self, Self::Csv | Self::Json)
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "parquet" | "pq" => Ok(Self::Parquet),
            _ => Err(Error::InvalidInput(format!("unsupported format: {s}"))),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Creates an import source reading `kind` records in `format` from `reader`.
///
/// # Errors
///
/// Returns an error if the format doesn't support import, or if a JSON
/// source is not an array of objects.
pub fn create_import_source<R: BufRead + 'static>(
    reader: R,
    format: Format,
    kind: EntityKind,
) -> Result<Box<dyn ImportSource>> {
    match format {
        Format::Csv => Ok(Box::new(csv::CsvImportSource::new(reader, kind))),
        Format::Json => Ok(Box::new(json::JsonImportSource::new(reader, kind)?)),
        Format::Parquet => Err(Error::InvalidInput(
            "parquet files are restored from backups, not imported".to_string(),
        )),
    }
}
