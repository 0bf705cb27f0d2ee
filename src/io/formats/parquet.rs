//! Apache Parquet backup files.
//!
//! A backup file holds one table. Its schema lists every field as a
//! non-null UTF-8 column and every value is stored as text, with missing
//! values written as the empty string. Files are Snappy-compressed and
//! carry the table name and creation time as key-value metadata.

use crate::models::{FieldValue, Record};
use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Metadata key holding the backed-up table's name.
pub const TABLE_METADATA_KEY: &str = "roster.table";
/// Metadata key holding the RFC 3339 creation time.
pub const CREATED_AT_METADATA_KEY: &str = "roster.created_at";

/// Writes `records` as the backup of `table` at `path`.
///
/// `fields` fixes the column order; every record must carry exactly these
/// fields. The file is written to a temporary sibling and renamed into
/// place, so an existing backup is only replaced by a complete one.
///
/// # Errors
///
/// Returns an error if a record's fields differ from `fields` or if
/// encoding or any filesystem step fails.
pub fn write_backup(path: &Path, table: &str, fields: &[String], records: &[Record]) -> Result<()> {
    let batch = to_record_batch(fields, records)?;
    let tmp = temporary_path(path);

    let written = write_batch(&tmp, table, &batch);
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }

    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        Error::operation("rename_backup", e)
    })
}

/// Reads every row of the backup file at `path`.
///
/// Values come back as text exactly as stored.
///
/// # Errors
///
/// Returns a configuration error if a column is not UTF-8 text, and an
/// operation error if the file cannot be opened or decoded.
pub fn read_backup(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).map_err(|e| Error::operation("open_backup", e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::operation("read_backup", e))?;

    let schema = builder.schema().clone();
    if let Some(field) = schema.fields().iter().find(|f| f.data_type() != &DataType::Utf8) {
        return Err(Error::Configuration(format!(
            "backup column '{}' has type {}, expected text",
            field.name(),
            field.data_type()
        )));
    }

    let reader = builder
        .build()
        .map_err(|e| Error::operation("read_backup", e))?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| Error::operation("read_backup", e))?;
        append_rows(&batch, &mut records)?;
    }
    Ok(records)
}

/// Builds the all-text Arrow schema for `fields`.
#[must_use]
pub fn backup_schema(fields: &[String]) -> Schema {
    Schema::new(
        fields
            .iter()
            .map(|name| Field::new(name, DataType::Utf8, false))
            .collect::<Vec<_>>(),
    )
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn to_record_batch(fields: &[String], records: &[Record]) -> Result<RecordBatch> {
    if let Some(position) = records
        .iter()
        .position(|r| !r.field_names().eq(fields.iter().map(String::as_str)))
    {
        return Err(Error::operation(
            "encode_backup",
            format!("row {} does not match the backup header", position + 1),
        ));
    }

    let columns: Vec<ArrayRef> = fields
        .iter()
        .map(|field| {
            let values: StringArray = records
                .iter()
                .map(|r| Some(r.get_or_missing(field).to_backup_text()))
                .collect();
            Arc::new(values) as ArrayRef
        })
        .collect();

    RecordBatch::try_new(Arc::new(backup_schema(fields)), columns)
        .map_err(|e| Error::operation("encode_backup", e))
}

fn write_batch(path: &Path, table: &str, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::operation("create_backup", e))?;

    let metadata = vec![
        KeyValue::new(TABLE_METADATA_KEY.to_string(), table.to_string()),
        KeyValue::new(
            CREATED_AT_METADATA_KEY.to_string(),
            chrono::Utc::now().to_rfc3339(),
        ),
    ];
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_key_value_metadata(Some(metadata))
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .map_err(|e| Error::operation("write_backup", e))?;
    writer
        .write(batch)
        .map_err(|e| Error::operation("write_backup", e))?;
    writer
        .close()
        .map_err(|e| Error::operation("write_backup", e))?;
    Ok(())
}

fn append_rows(batch: &RecordBatch, records: &mut Vec<Record>) -> Result<()> {
    let schema = batch.schema();
    let columns = batch
        .columns()
        .iter()
        .map(|column| {
            column.as_string_opt::<i32>().ok_or_else(|| {
                Error::Configuration("backup column is not text".to_string())
            })
        })
        .collect::<Result<Vec<_>>>()?;

    for row in 0..batch.num_rows() {
        let record = schema
            .fields()
            .iter()
            .zip(&columns)
            .map(|(field, column)| {
                let text = if column.is_null(row) {
                    String::new()
                } else {
                    column.value(row).to_string()
                };
                (field.name().clone(), FieldValue::Text(text))
            })
            .collect();
        records.push(record);
    }
    Ok(())
}

/// Reads a key-value metadata entry from the backup file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded.
pub fn read_metadata(path: &Path, key: &str) -> Result<Option<String>> {
    let file = File::open(path).map_err(|e| Error::operation("open_backup", e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::operation("read_backup", e))?;

    Ok(builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .and_then(|entries| entries.iter().find(|kv| kv.key == key))
        .and_then(|kv| kv.value.clone()))
}
