//! Table store trait.

use crate::models::Record;
use crate::storage::ColumnSpec;
use crate::Result;
use serde::Serialize;

/// Live metadata of one column, as the storage engine reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Declared type, verbatim from the engine (e.g. `INTEGER`, `TEXT`).
    pub declared_type: String,
}

impl ColumnInfo {
    /// Creates column metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }
}

/// Trait for table storage collaborators.
///
/// Every call is one self-contained storage session: implementations acquire
/// whatever connection they need at the start and release it before
/// returning, on success and on error alike.
///
/// Implementations must validate table names themselves; callers pass names
/// that came from file names and URL paths.
pub trait TableStore: Send + Sync {
    /// Lists a table's columns in declaration order.
    ///
    /// Returns an empty list when the table does not exist.
    fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Inserts rows into an existing table in one round trip.
    ///
    /// All rows must share the first row's field set. Returns the number of
    /// rows inserted.
    fn bulk_insert(&self, table: &str, rows: &[Record]) -> Result<usize>;

    /// Reads every row of a table.
    ///
    /// Returns an empty list when the table does not exist.
    fn read_all(&self, table: &str) -> Result<Vec<Record>>;

    /// Drops a table if it exists.
    fn drop_table(&self, table: &str) -> Result<()>;

    /// Creates a table with the given columns.
    fn create_table(&self, table: &str, columns: &[ColumnSpec]) -> Result<()>;

    /// Deletes every row of a table, keeping its definition.
    fn truncate_table(&self, table: &str) -> Result<()>;

    /// Checks whether a table exists.
    fn table_exists(&self, table: &str) -> Result<bool> {
        Ok(!self.list_columns(table)?.is_empty())
    }

    /// Replaces a table's definition and contents.
    ///
    /// The default composes drop, create and insert; engines with
    /// transactions should override it so readers never see the gap.
    fn replace_table(&self, table: &str, columns: &[ColumnSpec], rows: &[Record]) -> Result<usize> {
        self.drop_table(table)?;
        self.create_table(table, columns)?;
        if rows.is_empty() {
            return Ok(0);
        }
        self.bulk_insert(table, rows)
    }
}
