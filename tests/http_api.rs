//! HTTP API tests against an in-memory `SQLite` store.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use roster::RosterConfig;
use roster::server::{AppState, INTERNAL_ERROR_DETAIL, router};
use roster::storage::SqliteStore;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

struct Fixture {
    _dir: tempfile::TempDir,
    state: AppState,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        let config = RosterConfig::new()
            .with_data_dir(&data_dir)
            .with_backup_dir(dir.path().join("backups"));
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        Self {
            state: AppState::new(store, config),
            _dir: dir,
        }
    }

    fn data_dir(&self) -> &Path {
        &self.state.config.data_dir
    }

    fn write(&self, name: &str, contents: &str) {
        std::fs::write(self.data_dir().join(name), contents).unwrap();
    }

    async fn call(&self, method: Method, uri: &str) -> (StatusCode, Value, Option<String>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = router(self.state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let nosniff = response
            .headers()
            .get("x-content-type-options")
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body, nosniff)
    }

    fn seed(&self) {
        self.write("departments.csv", "1,Staff\n2,Sales\n");
        self.write("jobs.csv", "1,Recruiter\n2,Manager\n");
        self.write(
            "hired_employees.csv",
            "1,Ana,2021-02-10T10:00:00Z,1,1\n\
             2,Ben,2021-05-03T09:30:00Z,1,2\n\
             3,Cleo,2021-11-20T15:00:00Z,1,1\n\
             4,Dan,2021-07-01T08:00:00Z,2,2\n\
             5,,2021-07-01T08:00:00Z,2,2\n",
        );
    }
}

#[tokio::test]
async fn test_root_reports_health() {
    let fixture = Fixture::new();
    let (status, body, nosniff) = fixture.call(Method::GET, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "API running correctly");
    assert_eq!(nosniff.as_deref(), Some("nosniff"));

    let (status, _, _) = fixture.call(Method::HEAD, "/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_load_data_reports_each_file() {
    let fixture = Fixture::new();
    fixture.seed();
    fixture.write("payroll.csv", "1,2\n");

    let (status, body, _) = fixture.call(Method::POST, "/load-data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Process completed");

    let files = body["files_processed"].as_array().unwrap();
    assert_eq!(files.len(), 4);
    assert_eq!(files[0]["file"], "departments.csv");
    assert_eq!(files[0]["status"], "OK");
    assert_eq!(files[1]["file"], "hired_employees.csv");
    assert_eq!(files[1]["inserted"], 4);
    assert_eq!(files[1]["rejected"], 1);
    assert_eq!(files[3]["file"], "payroll.csv");
    assert_eq!(files[3]["status"], "ERROR");
    assert!(files[3]["detail"].as_str().unwrap().contains("payroll"));
}

#[tokio::test]
async fn test_backup_and_restore() {
    let fixture = Fixture::new();
    fixture.seed();
    fixture.call(Method::POST, "/load-data").await;

    let (status, body, _) = fixture.call(Method::POST, "/backup/jobs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], 2);
    assert!(body["path"].as_str().unwrap().ends_with("jobs.parquet"));

    let (status, body, _) = fixture.call(Method::POST, "/restore/jobs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], 2);
    assert!(body["message"].as_str().unwrap().contains("jobs"));
}

#[tokio::test]
async fn test_backup_client_errors() {
    let fixture = Fixture::new();

    let (status, body, _) = fixture.call(Method::POST, "/backup/departments").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("departments"));

    let (status, _, _) = fixture.call(Method::POST, "/backup/1bad").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_restore_without_backup() {
    let fixture = Fixture::new();
    let (status, body, _) = fixture.call(Method::POST, "/restore/jobs").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "no backup exists for jobs");
}

#[tokio::test]
async fn test_load_data_missing_directory_hides_detail() {
    let fixture = Fixture::new();
    std::fs::remove_dir_all(fixture.data_dir()).unwrap();

    let (status, body, _) = fixture.call(Method::POST, "/load-data").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], INTERNAL_ERROR_DETAIL);
}

#[tokio::test]
async fn test_reports() {
    let fixture = Fixture::new();
    fixture.seed();
    fixture.call(Method::POST, "/load-data").await;

    let (status, body, _) = fixture.call(Method::GET, "/hired-employees-by-quarter").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["department"], "Sales");
    assert_eq!(rows[0]["job"], "Manager");
    assert_eq!(rows[0]["Q3"], 1);
    assert_eq!(rows[2]["department"], "Staff");
    assert_eq!(rows[2]["job"], "Recruiter");
    assert_eq!(rows[2]["Q1"], 1);
    assert_eq!(rows[2]["Q4"], 1);

    let (status, body, _) = fixture.call(Method::GET, "/departments-above-average").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["department"], "Staff");
    assert_eq!(rows[0]["hired"], 3);

    let (status, body, _) = fixture
        .call(Method::GET, "/departments-above-average?year=2020")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}
