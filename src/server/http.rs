//! HTTP server - transition endpoint, ledger listing and dashboard page

use crate::config::TrackerConfig;
use crate::dashboard::DashboardMirror;
use crate::engine::TransitionEngine;
use crate::error::TrackError;
use crate::ledger::LedgerStore;
use crate::models::Stage;
use crate::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

// =============================================================================
// Application State
// =============================================================================

/// Shared across handlers. `gate` serializes mutating requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<TrackerConfig>,
    gate: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config: Arc::new(config),
            gate: Arc::new(Mutex::new(())),
        }
    }
}

// =============================================================================
// Request / Response Models
// =============================================================================

/// Body of `POST /api/transition`. Fields are optional so that missing values
/// get a 400 with a readable message instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitionRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
}

/// Stage changes the request surface accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Applied,
    Skipped,
}

impl Action {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "applied" | "mark_applied" => Some(Action::Applied),
            "skipped" | "mark_skipped" => Some(Action::Skipped),
            _ => None,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Action::Applied => Stage::Applied,
            Action::Skipped => Stage::Skipped,
        }
    }
}

impl TransitionRequest {
    /// Check the request before anything is touched
    pub fn validate(&self) -> std::result::Result<(String, Action), String> {
        let file = self
            .file
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| "Missing 'file' in request".to_string())?;
        let raw_action = self
            .action
            .as_deref()
            .ok_or_else(|| "Missing 'action' in request".to_string())?;
        let action = Action::parse(raw_action)
            .ok_or_else(|| format!("Unknown action '{}'", raw_action))?;
        Ok((file.to_string(), action))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionResponse {
    pub success: bool,
    pub identity: String,
    pub stage: Stage,
    pub previous_stage: Stage,
    pub document_path: String,
    /// What happened to the file on disk
    pub file: &'static str,
    pub row_created: bool,
    /// `updated`, `unchanged` or `failed`
    pub dashboard: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            success: false,
            error: error.into(),
        }),
    )
        .into_response()
}

fn status_for(err: &TrackError) -> StatusCode {
    match err {
        TrackError::UnknownArtifact(_) => StatusCode::NOT_FOUND,
        TrackError::DuplicateArtifact { .. } | TrackError::UnknownStatus { .. } => {
            StatusCode::CONFLICT
        }
        TrackError::InvalidArtifact(_) | TrackError::InvalidStage(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// Server Startup
// =============================================================================

/// Build the router; split out so tests can drive it without a socket
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_dashboard))
        .route("/health", get(health_check))
        .route("/api/applications", get(api_applications))
        .route("/api/transition", post(api_transition))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on loopback until Ctrl-C
pub async fn start_server(config: TrackerConfig, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let app = router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "request surface listening");
    println!("✓ Server listening on http://{}", addr);
    println!("  Dashboard: http://{}/", addr);
    println!("  Transitions: POST http://{}/api/transition", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

// =============================================================================
// Handlers
// =============================================================================

async fn health_check() -> &'static str {
    "OK"
}

/// Serve the dashboard page straight from disk so it always reflects the
/// last sync
async fn serve_dashboard(State(state): State<AppState>) -> Response {
    let path = state.config.dashboard_path();
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => error_response(
            StatusCode::NOT_FOUND,
            TrackError::MissingDashboard(path).to_string(),
        ),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Ledger rows as JSON
async fn api_applications(State(state): State<AppState>) -> Response {
    let config = state.config.clone();
    let loaded = tokio::task::spawn_blocking(move || {
        LedgerStore::new(&config)
            .load()
            .map(|ledger| ledger.rows().to_vec())
    })
    .await;

    match loaded {
        Ok(Ok(rows)) => Json(rows).into_response(),
        Ok(Err(e)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn api_transition(
    State(state): State<AppState>,
    Json(request): Json<TransitionRequest>,
) -> Response {
    let (file, action) = match request.validate() {
        Ok(parsed) => parsed,
        Err(message) => {
            tracing::warn!(%message, "rejected transition request");
            return error_response(StatusCode::BAD_REQUEST, message);
        }
    };

    let config = state.config.clone();
    let outcome = run_gated(state.gate.clone(), move || {
        run_transition(&config, &file, action.stage())
    })
    .await;

    match outcome {
        Ok(Ok(response)) => Json(response).into_response(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "transition failed");
            error_response(status_for(&e), e.to_string())
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Run blocking work while holding the gate. The guard moves into the
/// blocking task, so a client disconnect that drops the handler future does
/// not release the gate before the work finishes.
async fn run_gated<T, F>(
    gate: Arc<Mutex<()>>,
    work: F,
) -> std::result::Result<T, tokio::task::JoinError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let guard = gate.lock_owned().await;
    tokio::task::spawn_blocking(move || {
        let _guard = guard;
        work()
    })
    .await
}

/// Transition then sync. A sync failure is reported, never rolled back.
fn run_transition(
    config: &TrackerConfig,
    file: &str,
    to: Stage,
) -> std::result::Result<TransitionResponse, TrackError> {
    let report = TransitionEngine::new(config).transition(file, to)?;

    let (dashboard, warning) = match DashboardMirror::new(config).sync() {
        Ok(sync) => (sync.label(), None),
        Err(e) => {
            tracing::warn!(error = %e, "dashboard sync failed after transition");
            ("failed", Some(format!("Dashboard not updated: {}", e)))
        }
    };

    Ok(TransitionResponse {
        success: true,
        identity: report.identity,
        stage: report.to,
        previous_stage: report.from,
        document_path: report.document_path,
        file: report.file.label(),
        row_created: report.row_created,
        dashboard,
        warning,
    })
}
