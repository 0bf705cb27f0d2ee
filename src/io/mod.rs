//! Ingestion and backup I/O subsystem.
//!
//! # Architecture
//!
//! - **Format adapters** implement [`ImportSource`] for CSV and JSON and
//!   read/write Parquet backup files
//! - **Validation layer** checks each candidate record against its entity
//!   kind's rules
//! - **Services** orchestrate parsing, validation, chunked insertion,
//!   directory loading, backup and restore
//!
//! # Supported Formats
//!
//! | Format | Import | Backup | Notes |
//! |--------|--------|--------|-------|
//! | CSV | ✓ | - | Headerless, positional columns |
//! | JSON | ✓ | - | Array of objects |
//! | Parquet | - | ✓ | All-text columns, Snappy |
//!
//! # Examples
//!
//! ```rust,ignore
//! use roster::io::{BackupService, ImportOptions, ImportService};
//!
//! let importer = ImportService::new(store.clone());
//! let result = importer.import_from_file("data/jobs.csv".as_ref(), "jobs", &ImportOptions::default())?;
//! println!("{}", result.summary());
//!
//! let backups = BackupService::new(store, "backups");
//! backups.backup("jobs")?;
//! backups.restore("jobs")?;
//! ```

pub mod formats;
pub mod services;
pub mod traits;
pub mod validation;

pub use formats::Format;
pub use services::{
    BackupOutcome, BackupService, DEFAULT_CHUNK_SIZE, FileOutcome, ImportOptions, ImportResult,
    ImportService, LoadStatus, RejectedRecord, RestoreOutcome,
};
pub use traits::{ImportSource, RecordSource};
pub use validation::{RecordValidator, ValidationIssue, validate};
