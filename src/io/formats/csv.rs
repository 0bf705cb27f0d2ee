//! CSV format adapter.
//!
//! Source files carry no header row: columns map positionally onto the
//! entity kind's field sequence.

use crate::io::traits::ImportSource;
use crate::models::{EntityKind, FieldValue, Record};
use crate::{Error, Result};
use std::io::Read;

/// CSV import source.
///
/// Rows shorter than the kind's field sequence leave the trailing fields
/// missing; surplus columns are ignored.
pub struct CsvImportSource<R: Read> {
    reader: csv::Reader<R>,
    kind: EntityKind,
    row: csv::StringRecord,
}

impl<R: Read> CsvImportSource<R> {
    /// Creates a new CSV import source for `kind` records.
    #[must_use]
    pub fn new(reader: R, kind: EntityKind) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        Self {
            reader,
            kind,
            row: csv::StringRecord::new(),
        }
    }

    fn parse_row(&self) -> Record {
        self.kind
            .fields()
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let value = self.row.get(i).map_or(FieldValue::Missing, |cell| {
                    FieldValue::from_cell(cell, self.kind.field_type(field))
                });
                ((*field).to_string(), value)
            })
            .collect()
    }
}

impl<R: Read> ImportSource for CsvImportSource<R> {
    fn next(&mut self) -> Result<Option<Record>> {
        let has_record = self.reader.read_record(&mut self.row).map_err(|e| {
            let line = e.position().map_or(0, csv::Position::line);
            if e.is_io_error() {
                Error::operation("read_csv", e)
            } else {
                Error::Configuration(format!("malformed CSV at line {line}: {e}"))
            }
        })?;
        if !has_record {
            return Ok(None);
        }

        Ok(Some(self.parse_row()))
    }
}
