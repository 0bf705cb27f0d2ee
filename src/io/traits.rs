//! Core trait for import sources.
//!
//! Format adapters implement [`ImportSource`]; the import service pulls
//! records from it one at a time and groups them into chunks.

use crate::Result;
use crate::models::Record;

/// Source of candidate records.
///
/// Implementations read one entity kind's records from a specific format
/// (CSV, JSON) and yield them in source order. Every yielded record carries
/// the kind's full field set, with absent fields set to
/// [`FieldValue::Missing`](crate::models::FieldValue::Missing).
///
/// # Streaming
///
/// Sources should read data incrementally where the format allows it, so
/// large files are never held in memory all at once.
///
/// # Example Implementation
///
/// ```rust,ignore
/// impl ImportSource for LineSource {
///     fn next(&mut self) -> Result<Option<Record>> {
///         // Read next line, map it onto the kind's fields
///     }
/// }
/// ```
pub trait ImportSource {
    /// Reads the next record from the source.
    ///
    /// Returns `Ok(None)` when the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is malformed or unreadable. The error
    /// is fatal for the import.
    fn next(&mut self) -> Result<Option<Record>>;

    /// Returns an estimate of the total number of records.
    ///
    /// Returns `None` if unknown.
    fn size_hint(&self) -> Option<usize> {
        None
    }
}

/// An in-memory source over prepared records.
///
/// Useful for feeding records that were built programmatically.
#[derive(Debug, Default)]
pub struct RecordSource {
    records: std::vec::IntoIter<Record>,
}

impl RecordSource {
    /// Creates a source yielding `records` in order.
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

impl ImportSource for RecordSource {
    fn next(&mut self) -> Result<Option<Record>> {
        Ok(self.records.next())
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.records.len())
    }
}
