//! # Roster
//!
//! Bulk ingestion, validation and columnar backup for a small relational
//! store of employees, departments and jobs.
//!
//! ## Features
//!
//! - Chunked CSV/JSON import with per-record validation
//! - Per-table backup to self-describing Parquet files, all values as text
//! - Restore with identifier re-typing and full-table replacement
//! - Storage-agnostic core behind the [`TableStore`] trait
//! - SQLite and in-memory storage collaborators
//! - HTTP API and CLI front ends
//!
//! ## Example
//!
//! ```rust,ignore
//! use roster::io::{ImportOptions, ImportService};
//! use roster::storage::SqliteStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(SqliteStore::new("data/roster.db")?);
//! let service = ImportService::new(store);
//! let result = service.import_from_file("data/jobs.csv".as_ref(), "jobs", &ImportOptions::default())?;
//! println!("inserted {} rows", result.inserted);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod server;
pub mod storage;

pub use config::RosterConfig;
pub use models::{EntityKind, FieldValue, Record};
pub use storage::{ColumnInfo, MemoryStore, SqliteStore, TableStore};

/// Error type for roster operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When | HTTP class |
/// |---------|-------------|------------|
/// | `Configuration` | Unknown table/entity kind, malformed source, zero chunk size, schema mismatch | 400 |
/// | `InvalidInput` | Illegal table identifier, unsupported file extension | 400 |
/// | `TableMissing` | Backup of a table that does not exist | 400 |
/// | `TableEmpty` | Backup of a table with no rows | 400 |
/// | `BackupMissing` | Restore without a backup file | 400 |
/// | `BackupEmpty` | Restore of a backup file with no rows | 400 |
/// | `OperationFailed` | Storage or filesystem failures | 500 |
///
/// Per-record validation failures are never errors; they are reported as
/// data in [`io::ImportResult`].
#[derive(Debug, ThisError)]
pub enum Error {
    /// The import cannot start or continue because its inputs are unusable.
    ///
    /// Raised when:
    /// - The table name does not map to an entity kind
    /// - A CSV or JSON source cannot be parsed
    /// - The chunk size is zero
    /// - An existing table lacks columns the entity kind needs
    /// - A backup file column is not text
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A table name is not a plain SQL identifier
    /// - A file extension has no import format
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The table to back up does not exist.
    #[error("table {table} does not exist")]
    TableMissing {
        /// The requested table.
        table: String,
    },

    /// The table to back up has no rows.
    #[error("table {table} is empty")]
    TableEmpty {
        /// The requested table.
        table: String,
    },

    /// No backup file exists for the table.
    #[error("no backup exists for {table}")]
    BackupMissing {
        /// The requested table.
        table: String,
    },

    /// The backup file for the table holds no rows.
    #[error("the backup of {table} is empty")]
    BackupEmpty {
        /// The requested table.
        table: String,
    },

    /// An operation failed.
    ///
    /// Raised when:
    /// - `SQLite` statements fail (connection, constraint, I/O)
    /// - Files cannot be opened, written or renamed
    /// - Parquet encoding or decoding fails
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from any displayable cause.
    pub fn operation(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }

    /// Returns true for errors caused by missing resources.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TableMissing { .. }
                | Self::TableEmpty { .. }
                | Self::BackupMissing { .. }
                | Self::BackupEmpty { .. }
        )
    }

    /// Returns true when the caller, not the system, is at fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.is_not_found() || matches!(self, Self::Configuration(_) | Self::InvalidInput(_))
    }
}

/// Result type alias for roster operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Configuration("unknown table payroll".to_string());
        assert_eq!(err.to_string(), "configuration error: unknown table payroll");

        let err = Error::operation("bulk_insert", "disk I/O error");
        assert_eq!(
            err.to_string(),
            "operation 'bulk_insert' failed: disk I/O error"
        );

        let err = Error::BackupMissing {
            table: "jobs".to_string(),
        };
        assert_eq!(err.to_string(), "no backup exists for jobs");
    }

    #[test]
    fn test_error_classification() {
        let missing = Error::TableMissing {
            table: "departments".to_string(),
        };
        assert!(missing.is_not_found());
        assert!(missing.is_client_error());

        let bad = Error::InvalidInput("bad name".to_string());
        assert!(!bad.is_not_found());
        assert!(bad.is_client_error());

        let storage = Error::operation("read_all", "locked");
        assert!(!storage.is_client_error());
    }
}
