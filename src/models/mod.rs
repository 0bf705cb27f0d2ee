//! Data models for roster.
//!
//! Entity kinds describe the three tables the pipeline loads, [`FieldValue`]
//! is the tagged value every field carries from ingestion to restore, and
//! [`Record`] is an ordered set of named values.

mod entity;
mod record;
mod value;

pub use entity::EntityKind;
pub use record::Record;
pub use value::{FieldValue, SemanticType, is_missing_sentinel};
