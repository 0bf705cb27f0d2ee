//! HTTP API.
//!
//! | Method | Path | Behavior |
//! |--------|------|----------|
//! | GET/HEAD | `/` | health message |
//! | POST | `/load-data` | import every file of the data directory |
//! | POST | `/backup/{table}` | back up one table |
//! | POST | `/restore/{table}` | restore one table from its backup |
//! | GET | `/hired-employees-by-quarter?year=` | hires per quarter report |
//! | GET | `/departments-above-average?year=` | departments above the mean |

mod error;
mod handlers;

pub use error::{ApiError, INTERNAL_ERROR_DETAIL};
pub use handlers::{LoadResponse, ReportQuery};

use crate::config::RosterConfig;
use crate::storage::SqliteStore;
use crate::{Error, Result};
use axum::Router;
use axum::http::header;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// The database every request works against.
    pub store: Arc<SqliteStore>,
    /// Resolved configuration.
    pub config: Arc<RosterConfig>,
}

impl AppState {
    /// Creates handler state.
    #[must_use]
    pub fn new(store: Arc<SqliteStore>, config: RosterConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// Builds the application router with security headers and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/load-data", post(handlers::load_data))
        .route("/backup/{table}", post(handlers::backup))
        .route("/restore/{table}", post(handlers::restore))
        .route("/hired-employees-by-quarter", get(handlers::hires_by_quarter))
        .route("/departments-above-average", get(handlers::departments_above_average))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            header::HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            header::HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static("no-store"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API until the process is stopped.
///
/// Creates its own tokio runtime; call from synchronous code.
///
/// # Errors
///
/// Returns an error if the runtime cannot start, the address cannot be
/// bound, or the server fails.
pub fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| Error::operation("create_runtime", e))?;
    let addr = format!("{host}:{port}");
    let app = router(state);

    rt.block_on(async {
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::operation("bind", format!("{addr}: {e}")))?;
        tracing::info!(%addr, "Starting HTTP server");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::operation("serve", e))
    })
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received");
    }
}
