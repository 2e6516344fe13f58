//! Integration tests for the request surface
//!
//! Tests verify:
//! - `POST /api/transition` commits, moves and syncs
//! - Malformed requests are rejected before any mutation
//! - Unknown artifacts map to 404 with the ledger untouched
//! - Rows with an unrecognized status map to 409 and stay listed verbatim
//! - A dashboard failure is reported without rolling back
//! - Read-only routes

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use jobtrack::server::{router, AppState};
use jobtrack::{LedgerStore, Stage, TrackerConfig};
use serde_json::Value;
use std::fs;
use tempfile::TempDir;
use tower::ServiceExt;

const LEDGER: &str = "Date,Time,Company,Position,HTML_Path,PDF_Path,Status,Notes\n\
2025-02-01,09:00:00,Acme,Swe,,Resume/To_Apply/resume_acme-swe.pdf,Ready,\n";
const PAGE: &str = "<script>const csvText = ``;</script>";

fn setup() -> (TempDir, TrackerConfig) {
    let temp = TempDir::new().unwrap();
    let config = TrackerConfig::with_root(temp.path());
    fs::write(config.ledger_path(), LEDGER).unwrap();
    fs::write(config.dashboard_path(), PAGE).unwrap();
    let doc = temp.path().join("Resume/To_Apply/resume_acme-swe.pdf");
    fs::create_dir_all(doc.parent().unwrap()).unwrap();
    fs::write(doc, b"%PDF").unwrap();
    (temp, config)
}

async fn post(config: &TrackerConfig, body: &str) -> (StatusCode, Value) {
    let app = router(AppState::new(config.clone()));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/transition")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get(config: &TrackerConfig, uri: &str) -> (StatusCode, Vec<u8>) {
    let app = router(AppState::new(config.clone()));
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn test_transition_success() {
    let (temp, config) = setup();
    let (status, body) = post(
        &config,
        r#"{"action": "mark_applied", "file": "resume_acme-swe.pdf"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["identity"], "acme-swe");
    assert_eq!(body["stage"], "applied");
    assert_eq!(body["file"], "moved");
    assert_eq!(body["dashboard"], "updated");
    assert!(body.get("warning").is_none());

    assert!(temp.path().join("Resume/Applied/resume_acme-swe.pdf").is_file());
    let page = fs::read_to_string(config.dashboard_path()).unwrap();
    assert!(page.contains("resume_acme-swe.pdf,Applied"));
}

#[tokio::test]
async fn test_malformed_requests_are_rejected() {
    let (_temp, config) = setup();

    let (status, body) = post(&config, r#"{"action": "applied"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = post(&config, r#"{"action": "archive", "file": "acme-swe"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("archive"));

    let (status, _) = post(&config, "not json").await;
    assert!(status.is_client_error());

    assert_eq!(fs::read_to_string(config.ledger_path()).unwrap(), LEDGER);
    assert_eq!(fs::read_to_string(config.dashboard_path()).unwrap(), PAGE);
}

#[tokio::test]
async fn test_unknown_artifact_is_not_found() {
    let (_temp, config) = setup();
    let (status, body) = post(
        &config,
        r#"{"action": "skipped", "file": "resume_nonexistent.pdf"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(fs::read_to_string(config.ledger_path()).unwrap(), LEDGER);
}

#[tokio::test]
async fn test_unrecognized_status_is_conflict() {
    let (_temp, config) = setup();
    let ledger = "Date,Time,Company,Position,HTML_Path,PDF_Path,Status,Notes\n\
2025-02-01,09:00:00,Acme,Swe,,Resume/To_Apply/resume_acme-swe.pdf,Interview,\n";
    fs::write(config.ledger_path(), ledger).unwrap();

    let (status, body) = post(&config, r#"{"action": "applied", "file": "acme-swe"}"#).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Interview"));
    assert_eq!(fs::read_to_string(config.ledger_path()).unwrap(), ledger);

    let (status, body) = get(&config, "/api/applications").await;
    assert_eq!(status, StatusCode::OK);
    let rows: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(rows[0]["stage"], Value::Null);
    assert_eq!(rows[0]["status"], "Interview");
}

#[tokio::test]
async fn test_dashboard_failure_keeps_transition() {
    let (_temp, config) = setup();
    fs::write(config.dashboard_path(), "<html>no embedded data</html>").unwrap();

    let (status, body) = post(&config, r#"{"action": "Applied", "file": "acme-swe"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dashboard"], "failed");
    assert!(body["warning"].as_str().is_some());

    let ledger = LedgerStore::new(&config).load().unwrap();
    assert_eq!(ledger.rows()[0].stage, Stage::Applied);
}

#[tokio::test]
async fn test_read_only_routes() {
    let (_temp, config) = setup();

    let (status, body) = get(&config, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");

    let (status, body) = get(&config, "/api/applications").await;
    assert_eq!(status, StatusCode::OK);
    let rows: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(rows[0]["company"], "Acme");
    assert_eq!(rows[0]["stage"], "ready");

    let (status, body) = get(&config, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, PAGE.as_bytes());
}
