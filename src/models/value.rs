//! Tagged field values.
//!
//! A value's type is decided once, when a source cell is ingested, and then
//! carried through validation, storage, backup and restore.

use serde::{Serialize, Serializer};
use std::fmt;

/// Literal markers upstream readers use for "no value".
const MISSING_SENTINELS: &[&str] = &["nan", "NaN", "None", "null", "NULL"];

/// Returns true if `raw` (after trimming) denotes an absent value.
#[must_use]
pub fn is_missing_sentinel(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || MISSING_SENTINELS.contains(&trimmed)
}

/// Semantic type of a column: integer-like, text, or untyped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    /// Whole numbers.
    Integer,
    /// Anything else.
    Text,
    /// No declared type; each value keeps its own type.
    ///
    /// Only created by restore, for columns mixing integers and text. Live
    /// tables never infer to it.
    Any,
}

impl SemanticType {
    /// Infers the semantic type of a declared SQL column type.
    ///
    /// Any declaration containing `INT` is integer-like, following `SQLite`
    /// affinity rules; everything else is text.
    #[must_use]
    pub fn from_declared(declared: &str) -> Self {
        if declared.to_ascii_uppercase().contains("INT") {
            Self::Integer
        } else {
            Self::Text
        }
    }

    /// Returns the SQL type used when creating a column of this type.
    ///
    /// Untyped columns have an empty declaration, which `SQLite` gives BLOB
    /// affinity: stored values are never converted.
    #[must_use]
    pub const fn sql_type(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
            Self::Any => "",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            Self::Text => f.write_str("text"),
            Self::Any => f.write_str("any"),
        }
    }
}

/// A single field value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    /// A whole number.
    Integer(i64),
    /// Free text, stored as given.
    Text(String),
    /// No value.
    #[default]
    Missing,
}

impl FieldValue {
    /// Ingests a delimited-text cell.
    ///
    /// Sentinels become [`FieldValue::Missing`]. Cells of integer-typed fields
    /// that hold a whole number (including `"3.0"`) become
    /// [`FieldValue::Integer`]; anything else is kept verbatim as text.
    #[must_use]
    pub fn from_cell(raw: &str, ty: SemanticType) -> Self {
        if is_missing_sentinel(raw) {
            return Self::Missing;
        }
        match ty {
            SemanticType::Integer => {
                parse_whole_number(raw.trim()).map_or_else(|| Self::Text(raw.to_string()), Self::Integer)
            },
            SemanticType::Text | SemanticType::Any => Self::Text(raw.to_string()),
        }
    }

    /// Ingests a JSON value.
    ///
    /// Whole JSON numbers are integers regardless of the field's type, so a
    /// numeric name stays distinguishable from text. Strings go through
    /// [`FieldValue::from_cell`].
    #[must_use]
    pub fn from_json(value: &serde_json::Value, ty: SemanticType) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Missing,
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(whole_f64))
                .map_or_else(|| Self::Text(n.to_string()), Self::Integer),
            Value::String(s) => Self::from_cell(s, ty),
            Value::Bool(b) => Self::Text(b.to_string()),
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }

    /// Returns true for missing values and for text that is blank or a sentinel.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Text(s) => is_missing_sentinel(s),
            Self::Integer(_) => false,
        }
    }

    /// Turns blank or sentinel text into [`FieldValue::Missing`].
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Text(s) if is_missing_sentinel(&s) => Self::Missing,
            other => other,
        }
    }

    /// Returns the value as a number, parsing text if needed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            Self::Missing => None,
        }
    }

    /// Returns the integer payload, if this is an integer.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the text payload, if this is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value the way backup files store it.
    ///
    /// Missing values become the empty string.
    #[must_use]
    pub fn to_backup_text(&self) -> String {
        match self {
            Self::Integer(i) => i.to_string(),
            Self::Text(s) => s.clone(),
            Self::Missing => String::new(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
            Self::Missing => f.write_str("<missing>"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Missing => serializer.serialize_none(),
        }
    }
}

/// Parses `s` as a whole number, accepting float notation with no fraction.
fn parse_whole_number(s: &str) -> Option<i64> {
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(whole_f64))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn whole_f64(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i64)
}
