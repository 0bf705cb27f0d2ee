//! Chunked batch import.
//!
//! Reads candidate records from a source in chunks, validates each record
//! and bulk-inserts the accepted ones, one storage call per chunk.

use crate::io::formats::{Format, create_import_source};
use crate::io::traits::ImportSource;
use crate::io::validation::RecordValidator;
use crate::models::{EntityKind, Record};
use crate::storage::{TableSchema, TableStore};
use crate::{Error, Result};
use serde::Serialize;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Default number of records per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Options for a batch import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// File format; detected from the file extension when unset.
    pub format: Option<Format>,
    /// Maximum records per chunk. Must be at least 1.
    pub chunk_size: usize,
    /// Empty the target table before importing.
    pub truncate: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            format: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            truncate: false,
        }
    }
}

impl ImportOptions {
    /// Sets the file format.
    #[must_use]
    pub const fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the chunk size.
    #[must_use]
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Enables or disables truncating the table first.
    #[must_use]
    pub const fn with_truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }
}

/// A record that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    /// 1-based position of the record in the source.
    pub index: usize,
    /// Every rule the record violated.
    pub errors: Vec<String>,
}

/// Result of an import operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    /// Target table.
    pub table: String,
    /// Records inserted.
    pub inserted: usize,
    /// Records read from the source.
    pub total_processed: usize,
    /// Chunks read from the source.
    pub chunks: usize,
    /// Records that failed validation, in source order.
    pub rejected: Vec<RejectedRecord>,
}

impl ImportResult {
    /// Creates an empty result for `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            inserted: 0,
            total_processed: 0,
            chunks: 0,
            rejected: Vec::new(),
        }
    }

    /// Returns whether any records were inserted.
    #[must_use]
    pub const fn has_imports(&self) -> bool {
        self.inserted > 0
    }

    /// Returns whether any records were rejected.
    #[must_use]
    pub const fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }

    /// Summarizes the import in one line.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} records inserted into {} ({} processed, {} rejected, {} chunks)",
            self.inserted,
            self.table,
            self.total_processed,
            self.rejected.len(),
            self.chunks
        )
    }
}

/// Service for importing entity records into a table store.
pub struct ImportService {
    store: Arc<dyn TableStore>,
}

impl ImportService {
    /// Creates a new import service.
    #[must_use]
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Imports the records in the file at `path` into `table`.
    ///
    /// The table name is checked before the file is opened.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is not recognized, the format cannot
    /// be determined, the file cannot be read, or storage fails.
    pub fn import_from_file(
        &self,
        path: &Path,
        table: &str,
        options: &ImportOptions,
    ) -> Result<ImportResult> {
        let kind: EntityKind = table.parse()?;
        check_chunk_size(options.chunk_size)?;
        let format = match options.format {
            Some(format) => format,
            None => Format::from_path(path)?,
        };

        let file = std::fs::File::open(path).map_err(|e| Error::operation("open_import_file", e))?;
        let reader = std::io::BufReader::new(file);

        self.import_from_reader(reader, kind, format, options)
    }

    /// Imports `kind` records in `format` from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or storage errors occur.
    pub fn import_from_reader<R: BufRead + 'static>(
        &self,
        reader: R,
        kind: EntityKind,
        format: Format,
        options: &ImportOptions,
    ) -> Result<ImportResult> {
        check_chunk_size(options.chunk_size)?;
        let mut source = create_import_source(reader, format, kind)?;
        self.import_from_source(source.as_mut(), kind, options)
    }

    /// Imports `kind` records from a source.
    ///
    /// Chunks are committed independently: a fatal error leaves every
    /// earlier chunk inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the chunk size is zero, the table lacks a field
    /// of `kind`, the source is malformed, or storage fails.
    #[instrument(
        skip(self, source, options),
        fields(table = kind.table_name(), chunk_size = options.chunk_size)
    )]
    pub fn import_from_source(
        &self,
        source: &mut dyn ImportSource,
        kind: EntityKind,
        options: &ImportOptions,
    ) -> Result<ImportResult> {
        check_chunk_size(options.chunk_size)?;
        let table = kind.table_name();
        self.prepare_table(kind, options.truncate)?;

        let validator = RecordValidator::new(kind);
        let mut result = ImportResult::new(table);
        let mut accepted: Vec<Record> = Vec::with_capacity(options.chunk_size);
        let mut chunk_len = 0;

        loop {
            let next = source.next().inspect_err(|e| {
                error!(table, processed = result.total_processed, error = %e, "Import aborted");
            })?;
            let exhausted = next.is_none();

            if let Some(record) = next {
                result.total_processed += 1;
                chunk_len += 1;

                let record = record.normalized(kind);
                let errors = validator.validate(&record);
                if errors.is_empty() {
                    accepted.push(record);
                } else {
                    warn!(table, index = result.total_processed, ?errors, "Record rejected");
                    result.rejected.push(RejectedRecord {
                        index: result.total_processed,
                        errors,
                    });
                }
            }

            if chunk_len > 0 && (chunk_len == options.chunk_size || exhausted) {
                result.chunks += 1;
                self.flush_chunk(table, &accepted, &mut result)?;
                accepted.clear();
                chunk_len = 0;
            }

            if exhausted {
                break;
            }
        }

        info!(
            table,
            inserted = result.inserted,
            processed = result.total_processed,
            rejected = result.rejected.len(),
            chunks = result.chunks,
            "Import complete"
        );
        Ok(result)
    }

    /// Ensures `kind`'s table exists with every field the kind needs.
    fn prepare_table(&self, kind: EntityKind, truncate: bool) -> Result<()> {
        let table = kind.table_name();
        let schema = TableSchema::infer(&self.store.list_columns(table)?);

        if schema.is_empty() {
            info!(table, "Creating table");
            return self
                .store
                .create_table(table, TableSchema::for_kind(kind).columns());
        }

        let missing = schema.missing_fields(kind);
        if !missing.is_empty() {
            return Err(Error::Configuration(format!(
                "table {table} is missing columns: {}",
                missing.join(", ")
            )));
        }

        if truncate {
            info!(table, "Truncating table");
            self.store.truncate_table(table)?;
        }
        Ok(())
    }

    fn flush_chunk(&self, table: &str, accepted: &[Record], result: &mut ImportResult) -> Result<()> {
        if accepted.is_empty() {
            return Ok(());
        }

        let inserted = self.store.bulk_insert(table, accepted).inspect_err(|e| {
            error!(table, chunk = result.chunks, error = %e, "Chunk insert failed");
        })?;
        result.inserted += inserted;
        info!(table, chunk = result.chunks, inserted, "Chunk inserted");
        Ok(())
    }
}

fn check_chunk_size(chunk_size: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(Error::Configuration(
            "chunk size must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::traits::RecordSource;
    use crate::models::FieldValue;
    use crate::storage::MemoryStore;
    use std::io::Cursor;

    fn setup() -> (Arc<MemoryStore>, ImportService) {
        let store = Arc::new(MemoryStore::new());
        let service = ImportService::new(store.clone());
        (store, service)
    }

    const EMPLOYEES: &str = "1,Ada,2021-01-01T00:00:00Z,1,1\n\
                             2,Grace,2021-02-01T00:00:00Z,1,2\n\
                             3,Linus,2021-03-01T00:00:00Z,2,1\n\
                             4,,2021-04-01T00:00:00Z,2,2\n";

    fn import_csv(service: &ImportService, input: &str, kind: EntityKind, chunk_size: usize) -> ImportResult {
        service
            .import_from_reader(
                Cursor::new(input.to_string()),
                kind,
                Format::Csv,
                &ImportOptions::default().with_chunk_size(chunk_size),
            )
            .unwrap()
    }

    #[test]
    fn test_rejects_invalid_record() {
        let (store, service) = setup();
        let result = import_csv(&service, EMPLOYEES, EntityKind::Employee, 1000);

        assert_eq!(result.inserted, 3);
        assert_eq!(result.total_processed, 4);
        assert_eq!(result.chunks, 1);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].index, 4);
        assert!(result.rejected[0].errors[0].contains("name"));
        assert_eq!(store.row_count("hired_employees"), 3);
    }

    #[test]
    fn test_chunk_size_does_not_change_outcome() {
        let mut outcomes = Vec::new();
        for chunk_size in [1, 2, 10, 1000] {
            let (store, service) = setup();
            let result = import_csv(&service, EMPLOYEES, EntityKind::Employee, chunk_size);
            outcomes.push((result.inserted, result.rejected, store.read_all("hired_employees").unwrap()));
        }
        assert!(outcomes.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_chunk_count() {
        let (_, service) = setup();
        assert_eq!(import_csv(&service, EMPLOYEES, EntityKind::Employee, 1).chunks, 4);
        let (_, service) = setup();
        assert_eq!(import_csv(&service, EMPLOYEES, EntityKind::Employee, 3).chunks, 2);
        let (_, service) = setup();
        assert_eq!(import_csv(&service, "", EntityKind::Employee, 3).chunks, 0);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let (store, service) = setup();
        let err = service
            .import_from_reader(
                Cursor::new(EMPLOYEES.to_string()),
                EntityKind::Employee,
                Format::Csv,
                &ImportOptions::default().with_chunk_size(0),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(!store.table_exists("hired_employees").unwrap());
    }

    #[test]
    fn test_unknown_table_fails_before_reading() {
        let (_, service) = setup();
        let err = service
            .import_from_file(Path::new("/nonexistent/payroll.csv"), "payroll", &ImportOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_import_appends() {
        let (store, service) = setup();
        let input = "1,Staff\n2,Sales\n";
        import_csv(&service, input, EntityKind::Department, 1000);
        import_csv(&service, input, EntityKind::Department, 1000);
        assert_eq!(store.row_count("departments"), 4);
    }

    #[test]
    fn test_truncate_replaces_contents() {
        let (store, service) = setup();
        let input = "1,Staff\n2,Sales\n";
        import_csv(&service, input, EntityKind::Department, 1000);

        let options = ImportOptions::default().with_truncate(true);
        service
            .import_from_reader(Cursor::new(input.to_string()), EntityKind::Department, Format::Csv, &options)
            .unwrap();
        assert_eq!(store.row_count("departments"), 2);
    }

    #[test]
    fn test_table_missing_kind_columns() {
        let (store, service) = setup();
        store
            .create_table(
                "jobs",
                &[crate::storage::ColumnSpec::new("id", crate::models::SemanticType::Integer)],
            )
            .unwrap();

        let err = service
            .import_from_reader(
                Cursor::new("1,Engineer\n".to_string()),
                EntityKind::Job,
                Format::Csv,
                &ImportOptions::default(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("job"));
    }

    #[test]
    fn test_json_import() {
        let (store, service) = setup();
        let input = r#"[{"id": 1, "job": "Engineer"}, {"id": 0, "job": "Nobody"}]"#;
        let result = service
            .import_from_reader(
                Cursor::new(input.to_string()),
                EntityKind::Job,
                Format::Json,
                &ImportOptions::default(),
            )
            .unwrap();

        assert_eq!(result.inserted, 1);
        assert_eq!(result.rejected[0].index, 2);
        let rows = store.read_all("jobs").unwrap();
        assert_eq!(rows[0].get("job"), Some(&FieldValue::from("Engineer")));
    }

    #[test]
    fn test_import_from_source() {
        let (store, service) = setup();
        let mut source = RecordSource::new(vec![
            Record::blank(EntityKind::Job).with("id", 9).with("job", "Analyst"),
        ]);
        let result = service
            .import_from_source(&mut source, EntityKind::Job, &ImportOptions::default())
            .unwrap();
        assert_eq!(result.inserted, 1);
        assert_eq!(store.row_count("jobs"), 1);
        assert_eq!(
            result.summary(),
            "1 records inserted into jobs (1 processed, 0 rejected, 1 chunks)"
        );
    }

    #[test]
    fn test_source_records_are_normalized() {
        let (store, service) = setup();
        let employee = |id: i64, datetime: &str| {
            Record::new()
                .with("job_id", 1)
                .with("id", id)
                .with("name", "Ada")
                .with("datetime", datetime)
                .with("department_id", 1)
                .with("badge", "ignored")
        };
        let mut source = RecordSource::new(vec![
            employee(1, "2021-01-01T00:00:00Z"),
            employee(2, "nan"),
            employee(3, ""),
        ]);

        let result = service
            .import_from_source(&mut source, EntityKind::Employee, &ImportOptions::default())
            .unwrap();
        assert_eq!(result.inserted, 1);
        let rejected: Vec<usize> = result.rejected.iter().map(|r| r.index).collect();
        assert_eq!(rejected, vec![2, 3]);
        assert!(result.rejected[0].errors[0].starts_with("datetime"));

        let rows = store.read_all("hired_employees").unwrap();
        assert_eq!(
            rows[0].field_names().collect::<Vec<_>>(),
            EntityKind::Employee.fields().to_vec()
        );
    }

    #[test]
    fn test_import_from_file_detects_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("departments.csv");
        std::fs::write(&path, "1,Staff\n").unwrap();

        let (store, service) = setup();
        let result = service
            .import_from_file(&path, "departments", &ImportOptions::default())
            .unwrap();
        assert_eq!(result.inserted, 1);
        assert!(result.has_imports());
        assert!(!result.has_rejections());
        assert_eq!(store.row_count("departments"), 1);
    }
}
