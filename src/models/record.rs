//! Ordered records of named field values.

use crate::models::{EntityKind, FieldValue};
use serde::ser::{Serialize, SerializeMap, Serializer};

static MISSING: FieldValue = FieldValue::Missing;

/// An ordered mapping of field name to value.
///
/// Field order is preserved: it decides column order when a table is created
/// and the header order of backup files.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Creates a record holding every field of `kind`, all missing.
    #[must_use]
    pub fn blank(kind: EntityKind) -> Self {
        kind.fields()
            .iter()
            .map(|name| ((*name).to_string(), FieldValue::Missing))
            .collect()
    }

    /// Sets a field, replacing any previous value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Sets a field and returns the record.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns a field's value, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns a field's value, treating absent keys as missing.
    #[must_use]
    pub fn get_or_missing(&self, name: &str) -> &FieldValue {
        self.get(name).unwrap_or(&MISSING)
    }

    /// Returns a mutable reference to a field's value.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterates over field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Iterates over values in field order.
    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter().map(|(_, v)| v)
    }

    /// Iterates over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Projects the record onto `kind`'s fields, in the kind's order.
    ///
    /// Unknown fields are dropped, absent ones become missing, and sentinel
    /// text is normalized to [`FieldValue::Missing`].
    #[must_use]
    pub fn normalized(&self, kind: EntityKind) -> Self {
        kind.fields()
            .iter()
            .map(|name| ((*name).to_string(), self.get_or_missing(name).clone().normalized()))
            .collect()
    }

    /// Returns true if both records have the same field names in the same order.
    #[must_use]
    pub fn same_fields(&self, other: &Self) -> bool {
        self.field_names().eq(other.field_names())
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
