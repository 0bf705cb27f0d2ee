//! Entity kinds and their field layouts.

use crate::models::SemanticType;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kinds of entity the pipeline knows how to load.
///
/// Each kind owns one table and a fixed field sequence. Delimited-text
/// sources map their columns positionally onto that sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A hired employee.
    Employee,
    /// A department employees belong to.
    Department,
    /// A job employees hold.
    Job,
}

const EMPLOYEE_FIELDS: &[&str] = &["id", "name", "datetime", "department_id", "job_id"];
const DEPARTMENT_FIELDS: &[&str] = &["id", "department"];
const JOB_FIELDS: &[&str] = &["id", "job"];

impl EntityKind {
    /// Returns all entity kinds.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Employee, Self::Department, Self::Job]
    }

    /// Returns the table this kind is stored in.
    #[must_use]
    pub const fn table_name(&self) -> &'static str {
        match self {
            Self::Employee => "hired_employees",
            Self::Department => "departments",
            Self::Job => "jobs",
        }
    }

    /// Returns the ordered field names of this kind.
    #[must_use]
    pub const fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Employee => EMPLOYEE_FIELDS,
            Self::Department => DEPARTMENT_FIELDS,
            Self::Job => JOB_FIELDS,
        }
    }

    /// Returns the field holding the entity's human-readable name.
    #[must_use]
    pub const fn name_field(&self) -> &'static str {
        match self {
            Self::Employee => "name",
            Self::Department => "department",
            Self::Job => "job",
        }
    }

    /// Returns the semantic type a field of this kind is ingested as.
    ///
    /// Identifiers and references are integers, everything else is text.
    #[must_use]
    pub fn field_type(&self, field: &str) -> SemanticType {
        match (self, field) {
            (_, "id") | (Self::Employee, "department_id" | "job_id") => SemanticType::Integer,
            _ => SemanticType::Text,
        }
    }

    /// Looks up the kind stored in `table`.
    #[must_use]
    pub fn from_table_name(table: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.table_name() == table)
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    /// Parses a table name or kind name.
    fn from_str(s: &str) -> Result<Self> {
        if let Some(kind) = Self::from_table_name(s) {
            return Ok(kind);
        }
        match s.to_lowercase().as_str() {
            "employee" | "employees" => Ok(Self::Employee),
            "department" => Ok(Self::Department),
            "job" => Ok(Self::Job),
            _ => Err(Error::Configuration(format!("table {s} is not recognized"))),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_roundtrip() {
        for kind in EntityKind::all() {
            assert_eq!(EntityKind::from_table_name(kind.table_name()), Some(*kind));
            assert_eq!(kind.table_name().parse::<EntityKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_unknown_table_is_configuration_error() {
        let err = "payroll".parse::<EntityKind>().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("payroll"));
    }

    #[test]
    fn test_field_layouts() {
        assert_eq!(EntityKind::Employee.fields().len(), 5);
        assert_eq!(EntityKind::Department.fields(), &["id", "department"]);
        assert_eq!(EntityKind::Job.name_field(), "job");
    }

    #[test]
    fn test_field_types() {
        assert_eq!(EntityKind::Job.field_type("id"), SemanticType::Integer);
        assert_eq!(
            EntityKind::Employee.field_type("department_id"),
            SemanticType::Integer
        );
        assert_eq!(EntityKind::Employee.field_type("datetime"), SemanticType::Text);
        assert_eq!(EntityKind::Department.field_type("department"), SemanticType::Text);
    }
}
