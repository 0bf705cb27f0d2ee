//! Command handlers module.
//!
//! - `io.rs`: import, load, backup and restore
//! - `report.rs`: report queries
//! - `serve.rs`: HTTP server
//! - `config.rs`: configuration display

mod config;
mod io;
mod report;
mod serve;

use clap::ValueEnum;

pub use config::cmd_config;
pub use io::{cmd_backup, cmd_import, cmd_load, cmd_restore};
pub use report::cmd_report;
pub use serve::cmd_serve;

/// Available reports.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportKind {
    /// Hires per department and job, per quarter.
    HiresByQuarter,
    /// Departments hiring more than the mean.
    AboveAverage,
}
