//! In-memory table store.
//!
//! Mirrors the `SQLite` store's observable behavior closely enough for the
//! core to be tested without a database: inserting into a missing table or an
//! unknown column fails, reading a missing table yields no rows.

use crate::models::{FieldValue, Record};
use crate::storage::sqlite::acquire_lock;
use crate::storage::{ColumnInfo, ColumnSpec, TableStore, validate_table_name};
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default, Clone)]
struct MemoryTable {
    columns: Vec<ColumnSpec>,
    rows: Vec<Record>,
}

impl MemoryTable {
    /// Projects a row onto this table's columns.
    fn project(&self, table: &str, row: &Record) -> Result<Record> {
        if let Some(unknown) = row
            .field_names()
            .find(|name| !self.columns.iter().any(|c| c.name == *name))
        {
            return Err(Error::operation(
                "bulk_insert",
                format!("table {table} has no column named {unknown}"),
            ));
        }

        Ok(self
            .columns
            .iter()
            .map(|c| (c.name.clone(), row.get(&c.name).cloned().unwrap_or(FieldValue::Missing)))
            .collect())
    }
}

/// Process-local implementation of [`TableStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, MemoryTable>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rows in a table, zero if it does not exist.
    #[must_use]
    pub fn row_count(&self, table: &str) -> usize {
        acquire_lock(&self.tables)
            .get(table)
            .map_or(0, |t| t.rows.len())
    }
}

impl TableStore for MemoryStore {
    fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        validate_table_name(table)?;
        let tables = acquire_lock(&self.tables);
        Ok(tables.get(table).map_or_else(Vec::new, |t| {
            t.columns
                .iter()
                .map(|c| ColumnInfo::new(&c.name, c.ty.sql_type()))
                .collect()
        }))
    }

    fn bulk_insert(&self, table: &str, rows: &[Record]) -> Result<usize> {
        validate_table_name(table)?;
        let mut tables = acquire_lock(&self.tables);
        let target = tables
            .get_mut(table)
            .ok_or_else(|| Error::operation("bulk_insert", format!("no such table: {table}")))?;

        let projected = rows
            .iter()
            .map(|row| target.project(table, row))
            .collect::<Result<Vec<_>>>()?;
        target.rows.extend(projected);

        Ok(rows.len())
    }

    fn read_all(&self, table: &str) -> Result<Vec<Record>> {
        validate_table_name(table)?;
        let tables = acquire_lock(&self.tables);
        Ok(tables.get(table).map(|t| t.rows.clone()).unwrap_or_default())
    }

    fn drop_table(&self, table: &str) -> Result<()> {
        validate_table_name(table)?;
        acquire_lock(&self.tables).remove(table);
        Ok(())
    }

    fn create_table(&self, table: &str, columns: &[ColumnSpec]) -> Result<()> {
        validate_table_name(table)?;
        for column in columns {
            validate_table_name(&column.name)?;
        }
        let mut tables = acquire_lock(&self.tables);
        if tables.contains_key(table) {
            return Err(Error::operation(
                "create_table",
                format!("table {table} already exists"),
            ));
        }
        tables.insert(
            table.to_string(),
            MemoryTable {
                columns: columns.to_vec(),
                rows: Vec::new(),
            },
        );
        Ok(())
    }

    fn truncate_table(&self, table: &str) -> Result<()> {
        validate_table_name(table)?;
        let mut tables = acquire_lock(&self.tables);
        let target = tables
            .get_mut(table)
            .ok_or_else(|| Error::operation("truncate_table", format!("no such table: {table}")))?;
        target.rows.clear();
        Ok(())
    }

    fn replace_table(&self, table: &str, columns: &[ColumnSpec], rows: &[Record]) -> Result<usize> {
        validate_table_name(table)?;
        let mut replacement = MemoryTable {
            columns: columns.to_vec(),
            rows: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            let projected = replacement.project(table, row)?;
            replacement.rows.push(projected);
        }

        acquire_lock(&self.tables).insert(table.to_string(), replacement);
        Ok(rows.len())
    }
}
