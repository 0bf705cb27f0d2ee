//! Opening and locking the `SQLite` connection.

use crate::{Error, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// How long a statement waits on a database locked by another process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Locks `mutex`, recovering the guard if a previous holder panicked.
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("storage lock poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Opens a database file, or a private in-memory database for `None`.
///
/// File databases use WAL journaling with `NORMAL` sync.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or configured.
pub fn open_connection(path: Option<&Path>) -> Result<Connection> {
    let conn = match path {
        Some(path) => Connection::open(path),
        None => Connection::open_in_memory(),
    }
    .map_err(|e| Error::operation("open_sqlite", e))?;

    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|e| Error::operation("configure_sqlite", e))?;
    if path.is_some() {
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
            .map_err(|e| Error::operation("configure_sqlite", e))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(|e| Error::operation("configure_sqlite", e))?;
    }

    Ok(conn)
}
