//! Report command handler.

use roster::storage::DEFAULT_REPORT_YEAR;
use roster::{Error, Result, RosterConfig, SqliteStore};

use super::ReportKind;

/// Executes the report command, printing the rows as JSON.
pub fn cmd_report(config: &RosterConfig, kind: ReportKind, year: Option<i32>) -> Result<()> {
    let store = SqliteStore::new(&config.database)?;
    let year = year.unwrap_or(DEFAULT_REPORT_YEAR);

    let json = match kind {
        ReportKind::HiresByQuarter => serde_json::to_string_pretty(&store.hires_by_quarter(year)?),
        ReportKind::AboveAverage => {
            serde_json::to_string_pretty(&store.departments_above_average(year)?)
        },
    }
    .map_err(|e| Error::operation("serialize_report", e))?;

    println!("{json}");
    Ok(())
}
