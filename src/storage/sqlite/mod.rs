//! `SQLite` storage collaborator.
//!
//! ## Module Structure
//!
//! - `connection`: lock acquisition with poison recovery, connection pragmas
//! - `sql`: identifier quoting and statement builders
//! - `store`: [`SqliteStore`], the [`TableStore`](crate::storage::TableStore) implementation
//! - `reports`: the two analytical queries over the loaded tables

mod connection;
mod reports;
mod sql;
mod store;

pub use connection::{acquire_lock, open_connection};
pub use reports::{DEFAULT_REPORT_YEAR, DepartmentHires, QuarterlyHires};
pub use sql::{create_table_sql, insert_sql, quote_identifier};
pub use store::SqliteStore;
