//! Record validation.
//!
//! Checks one candidate record against its entity kind's rules and reports
//! every violated rule. Validation never fails: an empty issue list means
//! the record is accepted.

use crate::models::{EntityKind, FieldValue, Record};
use std::fmt;

/// A validation issue found on one field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// The field that has an issue.
    pub field: &'static str,
    /// Description of the issue.
    pub message: String,
}

impl ValidationIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validates records of one entity kind.
#[derive(Debug, Clone, Copy)]
pub struct RecordValidator {
    kind: EntityKind,
}

impl RecordValidator {
    /// Creates a validator for `kind`.
    #[must_use]
    pub const fn new(kind: EntityKind) -> Self {
        Self { kind }
    }

    /// Returns the kind this validator checks.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns every rule `record` violates, in field order.
    ///
    /// Absent keys are treated as missing values.
    #[must_use]
    pub fn issues(&self, record: &Record) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        check_reference(&mut issues, record, "id");

        match self.kind {
            EntityKind::Employee => {
                check_name(&mut issues, record, "name");
                if record.get_or_missing("datetime").is_absent() {
                    issues.push(ValidationIssue::new("datetime", "is required"));
                }
                check_reference(&mut issues, record, "department_id");
                check_reference(&mut issues, record, "job_id");
            },
            EntityKind::Department | EntityKind::Job => {
                check_name(&mut issues, record, self.kind.name_field());
            },
        }

        issues
    }

    /// Returns every rule `record` violates as human-readable messages.
    #[must_use]
    pub fn validate(&self, record: &Record) -> Vec<String> {
        self.issues(record).iter().map(ToString::to_string).collect()
    }
}

/// Validates `record` as an instance of `kind`.
///
/// Returns an empty list when the record is valid.
#[must_use]
pub fn validate(record: &Record, kind: EntityKind) -> Vec<String> {
    RecordValidator::new(kind).validate(record)
}

/// Identifiers and references: present, numeric and strictly positive.
fn check_reference(issues: &mut Vec<ValidationIssue>, record: &Record, field: &'static str) {
    let value = record.get_or_missing(field);
    if value.is_absent() {
        issues.push(ValidationIssue::new(field, "is missing or empty"));
        return;
    }
    match value.as_number() {
        None => issues.push(ValidationIssue::new(
            field,
            format!("must be numeric, got '{value}'"),
        )),
        Some(n) if n <= 0.0 => issues.push(ValidationIssue::new(
            field,
            format!("must be greater than zero, got {value}"),
        )),
        Some(_) => {},
    }
}

/// Name fields: present, non-blank text.
fn check_name(issues: &mut Vec<ValidationIssue>, record: &Record, field: &'static str) {
    match record.get_or_missing(field) {
        FieldValue::Text(s) if !s.trim().is_empty() && !crate::models::is_missing_sentinel(s) => {},
        FieldValue::Integer(_) => issues.push(ValidationIssue::new(field, "must be text")),
        _ => issues.push(ValidationIssue::new(field, "is required and must be non-blank text")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn employee() -> Record {
        Record::new()
            .with("id", 1)
            .with("name", "Ada Lovelace")
            .with("datetime", "2021-07-27T16:02:08Z")
            .with("department_id", 1)
            .with("job_id", 2)
    }

    #[test]
    fn test_valid_records() {
        assert!(validate(&employee(), EntityKind::Employee).is_empty());
        assert!(
            validate(
                &Record::new().with("id", 3).with("department", "Sales"),
                EntityKind::Department
            )
            .is_empty()
        );
        assert!(
            validate(&Record::new().with("id", 4).with("job", "Engineer"), EntityKind::Job).is_empty()
        );
    }

    #[test_case(FieldValue::Missing; "missing")]
    #[test_case(FieldValue::from("   "); "blank")]
    #[test_case(FieldValue::from("nan"); "nan marker")]
    #[test_case(FieldValue::from("None"); "none marker")]
    #[test_case(FieldValue::from("abc"); "non numeric")]
    #[test_case(FieldValue::Integer(0); "zero")]
    #[test_case(FieldValue::Integer(-5); "negative")]
    #[test_case(FieldValue::from("-2"); "negative text")]
    fn test_invalid_identifier(id: FieldValue) {
        let record = Record::new().with("id", id).with("job", "Engineer");
        let errors = validate(&record, EntityKind::Job);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("id"), "{errors:?}");
    }

    #[test]
    fn test_numeric_text_identifier_accepted() {
        let record = Record::new().with("id", "12").with("department", "Legal");
        assert!(validate(&record, EntityKind::Department).is_empty());
    }

    #[test_case("department_id", FieldValue::Missing; "missing department")]
    #[test_case("department_id", FieldValue::Integer(0); "zero department")]
    #[test_case("job_id", FieldValue::from("x"); "non numeric job")]
    #[test_case("job_id", FieldValue::Integer(-1); "negative job")]
    fn test_invalid_employee_reference(field: &str, value: FieldValue) {
        let mut record = employee();
        record.insert(field, value);
        let errors = validate(&record, EntityKind::Employee);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with(field), "{errors:?}");
    }

    #[test_case(FieldValue::Missing; "missing")]
    #[test_case(FieldValue::from(" "); "blank")]
    #[test_case(FieldValue::Integer(42); "numeric")]
    fn test_invalid_employee_name(name: FieldValue) {
        let mut record = employee();
        record.insert("name", name);
        let errors = validate(&record, EntityKind::Employee);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("name"));
    }

    #[test_case(FieldValue::Missing; "missing")]
    #[test_case(FieldValue::from(""); "empty")]
    #[test_case(FieldValue::from("nan"); "nan marker")]
    fn test_absent_datetime(datetime: FieldValue) {
        let mut record = employee();
        record.insert("datetime", datetime);
        assert_eq!(
            validate(&record, EntityKind::Employee),
            vec!["datetime: is required".to_string()]
        );
    }

    #[test]
    fn test_datetime_only_checked_for_presence() {
        let mut record = employee();
        record.insert("datetime", "not a date");
        assert!(validate(&record, EntityKind::Employee).is_empty());

        record.insert("datetime", FieldValue::Missing);
        assert_eq!(
            validate(&record, EntityKind::Employee),
            vec!["datetime: is required".to_string()]
        );
    }

    #[test]
    fn test_reports_every_violation() {
        let errors = validate(&Record::new(), EntityKind::Employee);
        let fields: Vec<&str> = errors
            .iter()
            .filter_map(|e| e.split(':').next())
            .collect();
        assert_eq!(fields, vec!["id", "name", "datetime", "department_id", "job_id"]);
    }

    #[test]
    fn test_name_field_per_kind() {
        let department = Record::new().with("id", 1).with("job", "Wrong field");
        let errors = validate(&department, EntityKind::Department);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("department"));
    }

    #[test]
    fn test_issue_display() {
        let validator = RecordValidator::new(EntityKind::Job);
        let issues = validator.issues(&Record::new().with("id", 1));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "job");
        assert_eq!(issues[0].to_string(), "job: is required and must be non-blank text");
        assert_eq!(validator.kind(), EntityKind::Job);
    }
}
