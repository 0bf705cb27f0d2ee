//! `SQLite`-backed table store.

use crate::models::{FieldValue, Record};
use crate::storage::sqlite::sql::{create_table_sql, insert_sql, quote_identifier};
use crate::storage::sqlite::{acquire_lock, open_connection};
use crate::storage::{ColumnInfo, ColumnSpec, TableStore, validate_table_name};
use crate::{Error, Result};
use rusqlite::types::{Null, ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql, Transaction, params_from_iter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::instrument;

/// `SQLite` implementation of [`TableStore`].
///
/// # Concurrency Model
///
/// Uses a `Mutex<Connection>`; each trait call holds the lock for exactly
/// one operation, which is the storage session boundary. WAL mode and
/// `busy_timeout` handle other processes touching the same file.
pub struct SqliteStore {
    /// Protected by Mutex because `rusqlite::Connection` is not `Sync`.
    conn: Mutex<Connection>,
    /// Path to the database (None for in-memory).
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens (or creates) a database file.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be opened.
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::operation("create_db_dir", e))?;
        }

        let conn = open_connection(Some(&db_path))?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        })
    }

    /// Creates an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn in_memory() -> Result<Self> {
        let conn = open_connection(None)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Runs `f` against the connection as one storage session.
    pub(crate) fn with_connection<T>(
        &self,
        operation: &str,
        f: impl FnOnce(&mut Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let mut conn = acquire_lock(&self.conn);
        f(&mut conn).map_err(|e| Error::operation(operation, e))
    }
}

fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_identifier(table)))?;
    let columns = stmt
        .query_map([], |row| {
            Ok(ColumnInfo::new(
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

fn insert_rows(tx: &Transaction<'_>, table: &str, rows: &[Record]) -> rusqlite::Result<usize> {
    let Some(first) = rows.first() else {
        return Ok(0);
    };

    let mut stmt = tx.prepare(&insert_sql(table, first.field_names()))?;
    for row in rows {
        stmt.execute(params_from_iter(row.values()))?;
    }
    Ok(rows.len())
}

fn check_uniform(rows: &[Record]) -> Result<()> {
    match rows.first() {
        Some(first) if rows.iter().any(|r| !r.same_fields(first)) => Err(Error::operation(
            "bulk_insert",
            "rows in one batch must share the same fields",
        )),
        _ => Ok(()),
    }
}

fn check_columns(table: &str, columns: &[ColumnSpec]) -> Result<()> {
    validate_table_name(table)?;
    for column in columns {
        validate_table_name(&column.name)?;
    }
    Ok(())
}

impl TableStore for SqliteStore {
    fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        validate_table_name(table)?;
        self.with_connection("list_columns", |conn| table_columns(conn, table))
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    fn bulk_insert(&self, table: &str, rows: &[Record]) -> Result<usize> {
        validate_table_name(table)?;
        check_uniform(rows)?;

        self.with_connection("bulk_insert", |conn| {
            let tx = conn.transaction()?;
            let inserted = insert_rows(&tx, table, rows)?;
            tx.commit()?;
            Ok(inserted)
        })
    }

    fn read_all(&self, table: &str) -> Result<Vec<Record>> {
        validate_table_name(table)?;

        self.with_connection("read_all", |conn| {
            if table_columns(conn, table)?.is_empty() {
                return Ok(Vec::new());
            }

            let mut stmt = conn.prepare(&format!("SELECT * FROM {}", quote_identifier(table)))?;
            let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let rows = stmt
                .query_map([], |row| {
                    names
                        .iter()
                        .enumerate()
                        .map(|(i, name)| Ok((name.clone(), field_value(row.get_ref(i)?))))
                        .collect::<rusqlite::Result<Record>>()
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    fn drop_table(&self, table: &str) -> Result<()> {
        validate_table_name(table)?;
        self.with_connection("drop_table", |conn| {
            conn.execute(&format!("DROP TABLE IF EXISTS {}", quote_identifier(table)), [])
                .map(|_| ())
        })
    }

    fn create_table(&self, table: &str, columns: &[ColumnSpec]) -> Result<()> {
        check_columns(table, columns)?;
        self.with_connection("create_table", |conn| {
            conn.execute(&create_table_sql(table, columns), []).map(|_| ())
        })
    }

    fn truncate_table(&self, table: &str) -> Result<()> {
        validate_table_name(table)?;
        self.with_connection("truncate_table", |conn| {
            conn.execute(&format!("DELETE FROM {}", quote_identifier(table)), [])
                .map(|_| ())
        })
    }

    #[instrument(skip(self, columns, rows), fields(rows = rows.len()))]
    fn replace_table(&self, table: &str, columns: &[ColumnSpec], rows: &[Record]) -> Result<usize> {
        check_columns(table, columns)?;
        check_uniform(rows)?;

        self.with_connection("replace_table", |conn| {
            let tx = conn.transaction()?;
            tx.execute(&format!("DROP TABLE IF EXISTS {}", quote_identifier(table)), [])?;
            tx.execute(&create_table_sql(table, columns), [])?;
            let inserted = insert_rows(&tx, table, rows)?;
            tx.commit()?;
            Ok(inserted)
        })
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Integer(i) => ToSqlOutput::from(*i),
            Self::Text(s) => ToSqlOutput::from(s.as_str()),
            Self::Missing => ToSqlOutput::from(Null),
        })
    }
}

/// Converts a column value read from `SQLite` into a field value.
///
/// Reals are kept as their text rendering; the core only distinguishes
/// integers from text.
pub(crate) fn field_value(value: ValueRef<'_>) -> FieldValue {
    match value {
        ValueRef::Null => FieldValue::Missing,
        ValueRef::Integer(i) => FieldValue::Integer(i),
        ValueRef::Real(f) => FieldValue::Text(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            FieldValue::Text(String::from_utf8_lossy(bytes).into_owned())
        },
    }
}
