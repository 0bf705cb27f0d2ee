//! Storage backend traits.

mod table;

pub use table::{ColumnInfo, TableStore};
