//! Import, load, backup and restore command handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use roster::io::{BackupService, ImportOptions, ImportService, LoadStatus};
use roster::{Error, Result, RosterConfig, SqliteStore, TableStore};

fn open_store(config: &RosterConfig) -> Result<Arc<dyn TableStore>> {
    Ok(Arc::new(SqliteStore::new(&config.database)?))
}

/// Executes the import command.
pub fn cmd_import(
    config: &RosterConfig,
    file: &Path,
    table: Option<String>,
    chunk_size: Option<usize>,
    truncate: bool,
) -> Result<()> {
    let table = match table {
        Some(table) => table,
        None => file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::InvalidInput(format!("cannot derive a table name from {}", file.display()))
            })?,
    };

    let options = ImportOptions::default()
        .with_chunk_size(chunk_size.unwrap_or(config.chunk_size))
        .with_truncate(truncate);

    let service = ImportService::new(open_store(config)?);
    let result = service.import_from_file(file, &table, &options)?;

    println!("{}", result.summary());
    for rejected in &result.rejected {
        println!("  record {}: {}", rejected.index, rejected.errors.join("; "));
    }
    Ok(())
}

/// Executes the load command.
pub fn cmd_load(config: &RosterConfig, dir: Option<PathBuf>) -> Result<()> {
    let dir = dir.unwrap_or_else(|| config.data_dir.clone());
    let options = ImportOptions::default().with_chunk_size(config.chunk_size);

    let service = ImportService::new(open_store(config)?);
    let outcomes = service.load_directory(&dir, &options)?;

    if outcomes.is_empty() {
        println!("No data files in {}", dir.display());
        return Ok(());
    }

    for outcome in &outcomes {
        match outcome.status {
            LoadStatus::Ok => println!(
                "OK     {}: {} inserted, {} rejected",
                outcome.file, outcome.inserted, outcome.rejected
            ),
            LoadStatus::Error => println!(
                "ERROR  {}: {}",
                outcome.file,
                outcome.detail.as_deref().unwrap_or("unknown error")
            ),
        }
    }
    Ok(())
}

/// Executes the backup command.
pub fn cmd_backup(config: &RosterConfig, table: &str) -> Result<()> {
    let service = BackupService::new(open_store(config)?, config.backup_dir.clone());
    let outcome = service.backup(table)?;
    println!(
        "Backup of {} saved in {} ({} rows)",
        outcome.table,
        outcome.path.display(),
        outcome.rows
    );
    Ok(())
}

/// Executes the restore command.
pub fn cmd_restore(config: &RosterConfig, table: &str) -> Result<()> {
    let service = BackupService::new(open_store(config)?, config.backup_dir.clone());
    let outcome = service.restore(table)?;
    println!(
        "Data restored in {} from {} ({} rows)",
        outcome.table,
        outcome.path.display(),
        outcome.rows
    );
    Ok(())
}
