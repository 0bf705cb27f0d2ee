//! Columnar backup and restore.
//!
//! A backup snapshots one table into `<backup_dir>/<table>.parquet` with
//! every value stored as text. A restore reads that file back, re-types
//! purely numeric identifiers as integers and replaces the table.

use crate::io::formats::Format;
use crate::io::formats::parquet::{read_backup, write_backup};
use crate::models::{FieldValue, Record};
use crate::storage::{TableSchema, TableStore, validate_table_name};
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// Field that is re-typed on restore.
const IDENTIFIER_FIELD: &str = "id";

/// Result of a backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupOutcome {
    /// Backed-up table.
    pub table: String,
    /// Written backup file.
    pub path: PathBuf,
    /// Rows written.
    pub rows: usize,
}

/// Result of a restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreOutcome {
    /// Restored table.
    pub table: String,
    /// Backup file read.
    pub path: PathBuf,
    /// Rows restored.
    pub rows: usize,
}

/// Service for backing up and restoring tables.
pub struct BackupService {
    store: Arc<dyn TableStore>,
    backup_dir: PathBuf,
}

impl BackupService {
    /// Creates a backup service writing into `backup_dir`.
    #[must_use]
    pub fn new(store: Arc<dyn TableStore>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            backup_dir: backup_dir.into(),
        }
    }

    /// Returns the backup directory.
    #[must_use]
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Returns where the backup of `table` is stored.
    #[must_use]
    pub fn backup_path(&self, table: &str) -> PathBuf {
        self.backup_dir
            .join(format!("{table}.{}", Format::Parquet.extension()))
    }

    /// Writes a backup of `table`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TableMissing`] or [`Error::TableEmpty`] without
    /// writing a file, and an operation error if reading or writing fails.
    #[instrument(skip(self))]
    pub fn backup(&self, table: &str) -> Result<BackupOutcome> {
        validate_table_name(table)?;
        if !self.store.table_exists(table)? {
            return Err(Error::TableMissing {
                table: table.to_string(),
            });
        }

        let records = self.store.read_all(table)?;
        let Some(first) = records.first() else {
            return Err(Error::TableEmpty {
                table: table.to_string(),
            });
        };
        let fields: Vec<String> = first.field_names().map(String::from).collect();

        std::fs::create_dir_all(&self.backup_dir)
            .map_err(|e| Error::operation("create_backup_dir", e))?;
        let path = self.backup_path(table);
        write_backup(&path, table, &fields, &records)?;

        info!(table, rows = records.len(), path = %path.display(), "Backup written");
        Ok(BackupOutcome {
            table: table.to_string(),
            path,
            rows: records.len(),
        })
    }

    /// Replaces `table` with the contents of its backup.
    ///
    /// The `id` column is created as an integer column when every restored
    /// identifier is a whole number; all other columns are text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackupMissing`] or [`Error::BackupEmpty`] without
    /// touching the table, a configuration error if the file holds
    /// non-text columns, and an operation error if storage fails.
    #[instrument(skip(self))]
    pub fn restore(&self, table: &str) -> Result<RestoreOutcome> {
        validate_table_name(table)?;
        let path = self.backup_path(table);
        if !path.is_file() {
            return Err(Error::BackupMissing {
                table: table.to_string(),
            });
        }

        let mut records = read_backup(&path)?;
        if records.is_empty() {
            return Err(Error::BackupEmpty {
                table: table.to_string(),
            });
        }
        records.iter_mut().for_each(retype_identifier);

        let schema = TableSchema::from_records(&records);
        let rows = self.store.replace_table(table, schema.columns(), &records)?;

        info!(table, rows, path = %path.display(), "Backup restored");
        Ok(RestoreOutcome {
            table: table.to_string(),
            path,
            rows,
        })
    }
}

/// Turns an identifier made only of ASCII digits back into an integer.
fn retype_identifier(record: &mut Record) {
    if let Some(value) = record.get_mut(IDENTIFIER_FIELD) {
        let parsed = match value {
            FieldValue::Text(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                s.parse::<i64>().ok()
            },
            _ => None,
        };
        if let Some(id) = parsed {
            *value = FieldValue::Integer(id);
        }
    }
}
