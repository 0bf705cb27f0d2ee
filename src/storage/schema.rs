//! Schema inference.
//!
//! Normalizes live column metadata into a [`TableSchema`]: an ordered list of
//! columns, each integer-like or text.

use crate::models::{EntityKind, FieldValue, Record, SemanticType};
use crate::storage::ColumnInfo;
use serde::Serialize;

/// A column to create, or a normalized column of a live table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,
    /// Semantic type.
    pub ty: SemanticType,
}

impl ColumnSpec {
    /// Creates a column spec.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: SemanticType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Normalized description of a table's columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// Infers a schema from live column metadata.
    ///
    /// An empty input yields an empty schema, which callers read as "table
    /// does not exist".
    #[must_use]
    pub fn infer(columns: &[ColumnInfo]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|c| ColumnSpec::new(&c.name, SemanticType::from_declared(&c.declared_type)))
                .collect(),
        }
    }

    /// Returns the schema a table for `kind` is created with.
    #[must_use]
    pub fn for_kind(kind: EntityKind) -> Self {
        Self {
            columns: kind
                .fields()
                .iter()
                .map(|field| ColumnSpec::new(*field, kind.field_type(field)))
                .collect(),
        }
    }

    /// Derives a schema from restored records.
    ///
    /// Columns follow the first record's field order. A column is integer
    /// when every record holds an integer in it, untyped when integers and
    /// other values mix, and text otherwise.
    #[must_use]
    pub fn from_records(records: &[Record]) -> Self {
        let Some(first) = records.first() else {
            return Self::default();
        };

        let columns = first
            .field_names()
            .map(|name| {
                let integers = records
                    .iter()
                    .filter(|r| matches!(r.get(name), Some(FieldValue::Integer(_))))
                    .count();
                let ty = match integers {
                    0 => SemanticType::Text,
                    n if n == records.len() => SemanticType::Integer,
                    _ => SemanticType::Any,
                };
                ColumnSpec::new(name, ty)
            })
            .collect();

        Self { columns }
    }

    /// Returns the columns in order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Returns true if the schema has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the semantic type of a column.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<SemanticType> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.ty)
    }

    /// Returns the fields of `kind` this schema has no column for.
    #[must_use]
    pub fn missing_fields(&self, kind: EntityKind) -> Vec<&'static str> {
        kind.fields()
            .iter()
            .copied()
            .filter(|field| self.get(field).is_none())
            .collect()
    }
}
