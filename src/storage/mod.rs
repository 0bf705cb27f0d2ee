//! Storage layer abstraction.
//!
//! The ingestion and backup core only talks to storage through the
//! [`TableStore`] trait: enumerate a table's columns, bulk insert, read every
//! row, and drop/create/truncate tables. Two collaborators implement it:
//!
//! - [`SqliteStore`]: durable `SQLite` storage, also serving the reports
//! - [`MemoryStore`]: process-local tables, used by tests and embedders

// Allow significant_drop_tightening - guards are scoped to one operation.
#![allow(clippy::significant_drop_tightening)]

pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryStore;
pub use schema::{ColumnSpec, TableSchema};
pub use sqlite::{DEFAULT_REPORT_YEAR, DepartmentHires, QuarterlyHires, SqliteStore};
pub use traits::{ColumnInfo, TableStore};

use crate::{Error, Result};

/// Checks that `table` is a plain identifier: an ASCII letter or underscore
/// followed by ASCII letters, digits or underscores.
///
/// Table names flow into SQL statements and backup file names, so anything
/// else is rejected.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for any other name.
pub fn validate_table_name(table: &str) -> Result<()> {
    let mut chars = table.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid_start && valid_rest && table.len() <= 64 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "'{table}' is not a valid table name"
        )))
    }
}
