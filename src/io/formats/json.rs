//! JSON format adapter.
//!
//! Sources are a single JSON array of objects; each object's keys name the
//! kind's fields.
//!
//! The whole document is parsed when the source is created, so chunking
//! bounds the size of each insert but not the memory a JSON import needs.
//! Objects are turned into records one at a time as the importer pulls them.

use crate::io::traits::ImportSource;
use crate::models::{EntityKind, FieldValue, Record};
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::io::Read;

/// JSON import source.
///
/// Unknown keys are ignored and absent keys become missing values.
pub struct JsonImportSource {
    objects: std::vec::IntoIter<Map<String, Value>>,
    kind: EntityKind,
}

impl JsonImportSource {
    /// Parses `reader` as an array of `kind` objects.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the document is not valid JSON or
    /// not an array of objects, and an operation error if reading fails.
    pub fn new<R: Read>(reader: R, kind: EntityKind) -> Result<Self> {
        let document: Value = serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                Error::operation("read_json", e)
            } else {
                Error::Configuration(format!("malformed JSON: {e}"))
            }
        })?;

        let Value::Array(items) = document else {
            return Err(Error::Configuration(
                "JSON source must be an array of objects".to_string(),
            ));
        };

        let objects = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => Ok(map),
                _ => Err(Error::Configuration(format!(
                    "JSON array element {} is not an object",
                    i + 1
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            objects: objects.into_iter(),
            kind,
        })
    }

    fn parse_object(&self, object: &Map<String, Value>) -> Record {
        self.kind
            .fields()
            .iter()
            .map(|field| {
                let value = object.get(*field).map_or(FieldValue::Missing, |v| {
                    FieldValue::from_json(v, self.kind.field_type(field))
                });
                ((*field).to_string(), value)
            })
            .collect()
    }
}

impl ImportSource for JsonImportSource {
    fn next(&mut self) -> Result<Option<Record>> {
        Ok(self.objects.next().map(|object| self.parse_object(&object)))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.objects.len())
    }
}
