//! HTTP request handlers.
//!
//! Core operations are blocking; every handler runs them on the blocking
//! thread pool.

use crate::io::{BackupService, FileOutcome, ImportOptions, ImportService};
use crate::server::AppState;
use crate::server::error::ApiError;
use crate::storage::{DEFAULT_REPORT_YEAR, DepartmentHires, QuarterlyHires, TableStore};
use crate::Result;
use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

/// Query string of the report endpoints.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Report year; defaults to 2021.
    pub year: Option<i32>,
}

/// Response of the directory load endpoint.
#[derive(Debug, Serialize)]
pub struct LoadResponse {
    /// Summary message.
    pub message: String,
    /// One outcome per file.
    pub files_processed: Vec<FileOutcome>,
}

async fn run_blocking<T, F>(f: F) -> std::result::Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::join(&e))?
        .map_err(ApiError::from)
}

fn table_store(state: &AppState) -> Arc<dyn TableStore> {
    state.store.clone()
}

/// `GET /` and `HEAD /`.
pub async fn root() -> Json<Value> {
    info!("Root endpoint accessed");
    Json(json!({ "message": "API running correctly" }))
}

/// `POST /load-data`: imports every file of the data directory.
pub async fn load_data(State(state): State<AppState>) -> std::result::Result<Json<LoadResponse>, ApiError> {
    let service = ImportService::new(table_store(&state));
    let data_dir = state.config.data_dir.clone();
    let options = ImportOptions::default().with_chunk_size(state.config.chunk_size);

    info!(dir = %data_dir.display(), "Starting data load");
    let files_processed = run_blocking(move || service.load_directory(&data_dir, &options)).await?;

    Ok(Json(LoadResponse {
        message: "Process completed".to_string(),
        files_processed,
    }))
}

/// `POST /backup/{table}`.
pub async fn backup(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> std::result::Result<Json<Value>, ApiError> {
    let service = BackupService::new(table_store(&state), state.config.backup_dir.clone());

    info!(table, "Starting backup");
    let outcome = run_blocking(move || service.backup(&table)).await?;

    Ok(Json(json!({
        "message": format!("Backup of {} saved in {}", outcome.table, outcome.path.display()),
        "path": outcome.path,
        "rows": outcome.rows,
    })))
}

/// `POST /restore/{table}`.
pub async fn restore(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> std::result::Result<Json<Value>, ApiError> {
    let service = BackupService::new(table_store(&state), state.config.backup_dir.clone());

    info!(table, "Starting restore");
    let outcome = run_blocking(move || service.restore(&table)).await?;

    Ok(Json(json!({
        "message": format!("Data restored in {} from {}", outcome.table, outcome.path.display()),
        "rows": outcome.rows,
    })))
}

/// `GET /hired-employees-by-quarter`.
pub async fn hires_by_quarter(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> std::result::Result<Json<Vec<QuarterlyHires>>, ApiError> {
    let year = query.year.unwrap_or(DEFAULT_REPORT_YEAR);
    let store = state.store.clone();
    Ok(Json(run_blocking(move || store.hires_by_quarter(year)).await?))
}

/// `GET /departments-above-average`.
pub async fn departments_above_average(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> std::result::Result<Json<Vec<DepartmentHires>>, ApiError> {
    let year = query.year.unwrap_or(DEFAULT_REPORT_YEAR);
    let store = state.store.clone();
    Ok(Json(run_blocking(move || store.departments_above_average(year)).await?))
}
