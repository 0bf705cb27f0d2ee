//! Property-based tests for record validation and identifier restore.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use roster::io::{BackupService, RecordValidator};
use roster::models::SemanticType;
use roster::storage::{ColumnSpec, SqliteStore, TableStore};
use roster::{EntityKind, FieldValue, Record};
use std::sync::Arc;

fn employee(id: FieldValue, department_id: FieldValue) -> Record {
    Record::new()
        .with("id", id)
        .with("name", "Ana")
        .with("datetime", "2021-01-01T00:00:00Z")
        .with("department_id", department_id)
        .with("job_id", 1)
}

fn has_issue(record: &Record, field: &str) -> bool {
    RecordValidator::new(EntityKind::Employee)
        .validate(record)
        .iter()
        .any(|e| e.starts_with(field))
}

proptest! {
    #[test]
    fn prop_non_positive_ids_rejected(id in i64::MIN..=0) {
        prop_assert!(has_issue(&employee(FieldValue::Integer(id), FieldValue::Integer(1)), "id"));
    }

    #[test]
    fn prop_non_numeric_ids_rejected(id in "[a-zA-Z_ -]{0,12}") {
        prop_assert!(has_issue(&employee(FieldValue::Text(id), FieldValue::Integer(1)), "id"));
    }

    #[test]
    fn prop_accepted_employees_have_positive_references(
        id in 1_i64..1_000_000,
        department_id in -5_i64..5,
    ) {
        let record = employee(FieldValue::Integer(id), FieldValue::Integer(department_id));
        let errors = RecordValidator::new(EntityKind::Employee).validate(&record);
        prop_assert_eq!(errors.is_empty(), department_id > 0);
    }

    #[test]
    fn prop_restore_retypes_purely_numeric_ids(
        ids in prop::collection::vec(prop_oneof!["[0-9]{1,12}", "[a-z][a-z0-9-]{0,8}"], 1..12),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store
            .create_table(
                "jobs",
                &[
                    ColumnSpec::new("id", SemanticType::Text),
                    ColumnSpec::new("job", SemanticType::Text),
                ],
            )
            .unwrap();
        let rows: Vec<Record> = ids
            .iter()
            .map(|id| Record::new().with("id", id.as_str()).with("job", "Clerk"))
            .collect();
        store.bulk_insert("jobs", &rows).unwrap();

        let service = BackupService::new(store.clone(), dir.path());
        service.backup("jobs").unwrap();
        service.restore("jobs").unwrap();

        let restored = store.read_all("jobs").unwrap();
        prop_assert_eq!(restored.len(), ids.len());
        for (id, row) in ids.iter().zip(&restored) {
            let value = row.get("id").unwrap();
            if id.bytes().all(|b| b.is_ascii_digit()) {
                prop_assert_eq!(value, &FieldValue::Integer(id.parse().unwrap()));
            } else {
                prop_assert_eq!(value, &FieldValue::Text(id.clone()));
            }
        }
    }
}
