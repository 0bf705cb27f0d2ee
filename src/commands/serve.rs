//! Serve command handler.

use std::sync::Arc;

use roster::server::{self, AppState};
use roster::{Result, RosterConfig, SqliteStore};

/// Executes the serve command.
pub fn cmd_serve(config: RosterConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    let store = Arc::new(SqliteStore::new(&config.database)?);
    println!("Serving on http://{host}:{port}");
    server::serve(AppState::new(store, config), &host, port)
}
