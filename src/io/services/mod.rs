//! Import, load and backup services.
//!
//! Orchestrates format parsing, validation, and storage operations.

pub mod backup;
pub mod import;
pub mod load;

pub use backup::{BackupOutcome, BackupService, RestoreOutcome};
pub use import::{DEFAULT_CHUNK_SIZE, ImportOptions, ImportResult, ImportService, RejectedRecord};
pub use load::{FileOutcome, LoadStatus};
