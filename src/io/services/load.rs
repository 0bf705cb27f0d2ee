//! Directory loading.
//!
//! Imports every data file in a directory, one table per file, isolating
//! each file's failure from the others.

use crate::io::formats::Format;
use crate::io::services::import::{ImportOptions, ImportService};
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Extensions of database files that live next to the data files.
const DATABASE_EXTENSIONS: &[&str] = &["db", "sqlite", "sqlite3"];

/// Whether a file was imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoadStatus {
    /// The file was imported; some records may still have been rejected.
    Ok,
    /// The import could not run or was aborted.
    Error,
}

/// Outcome of loading one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    /// File name within the directory.
    pub file: String,
    /// Detected format, if the extension is supported.
    #[serde(rename = "type")]
    pub format: Option<Format>,
    /// Whether the file was imported.
    pub status: LoadStatus,
    /// Records inserted.
    pub inserted: usize,
    /// Records rejected by validation.
    pub rejected: usize,
    /// Error description for failed files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl FileOutcome {
    fn failed(file: String, format: Option<Format>, error: &Error) -> Self {
        Self {
            file,
            format,
            status: LoadStatus::Error,
            inserted: 0,
            rejected: 0,
            detail: Some(error.to_string()),
        }
    }
}

impl ImportService {
    /// Imports every data file in `dir`, in file name order.
    ///
    /// The table name is the file stem and the format comes from the
    /// extension. Hidden files and database files are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error only if `dir` cannot be listed; per-file failures
    /// are reported in the outcomes.
    #[instrument(skip(self, options), fields(dir = %dir.display()))]
    pub fn load_directory(&self, dir: &Path, options: &ImportOptions) -> Result<Vec<FileOutcome>> {
        let files = data_files(dir)?;
        info!(files = files.len(), "Loading data directory");

        let outcomes = files
            .into_iter()
            .map(|path| self.load_file(&path, options))
            .collect();
        Ok(outcomes)
    }

    fn load_file(&self, path: &Path, options: &ImportOptions) -> FileOutcome {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let table = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let format = match Format::from_path(path) {
            Ok(format) if format.supports_import() => format,
            Ok(format) => {
                let err = Error::InvalidInput(format!("{format} files cannot be imported"));
                warn!(file, error = %err, "Skipping file");
                return FileOutcome::failed(file, Some(format), &err);
            },
            Err(err) => {
                warn!(file, error = %err, "Skipping file");
                return FileOutcome::failed(file, None, &err);
            },
        };

        let options = options.clone().with_format(format);
        match self.import_from_file(path, &table, &options) {
            Ok(result) => {
                info!(file, inserted = result.inserted, "File loaded");
                FileOutcome {
                    file,
                    format: Some(format),
                    status: LoadStatus::Ok,
                    inserted: result.inserted,
                    rejected: result.rejected.len(),
                    detail: None,
                }
            },
            Err(err) => {
                warn!(file, error = %err, "File failed to load");
                FileOutcome::failed(file, Some(format), &err)
            },
        }
    }
}

/// Lists the loadable files of `dir`, sorted by name.
fn data_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::operation("read_data_dir", e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::operation("read_data_dir", e))?;
        let path = entry.path();
        if path.is_file() && !is_skipped(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_skipped(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'));
    let database = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| DATABASE_EXTENSIONS.contains(&e.to_lowercase().as_str()));
    hidden || database
}
