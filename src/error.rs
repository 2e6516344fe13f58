//! Error taxonomy shared by the ledger, locator, engine and dashboard layers.

use std::path::PathBuf;

/// Result type for tracker operations
pub type TrackResult<T> = Result<T, TrackError>;

/// Errors that can occur while synchronizing ledger, stage directories and dashboard
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("Ledger not found: {}", .0.display())]
    MissingLedger(PathBuf),

    #[error("Dashboard not found: {}", .0.display())]
    MissingDashboard(PathBuf),

    #[error("No ledger row or stage file matches artifact '{0}'")]
    UnknownArtifact(String),

    #[error("Artifact '{identity}' appears in {count} ledger rows")]
    DuplicateArtifact { identity: String, count: usize },

    #[error("Invalid artifact reference: '{0}'")]
    InvalidArtifact(String),

    #[error("Unknown stage '{0}' (expected one of: drafted, ready, applied, skipped)")]
    InvalidStage(String),

    #[error("Unrecognized ledger header: {0}")]
    UnknownSchema(String),

    #[error("Unrecognized status '{status}' on ledger line {line}")]
    UnknownStatus { status: String, line: usize },

    #[error("Dashboard delimiter not found: {0}")]
    DelimiterNotFound(&'static str),

    #[error("Ledger text contains the dashboard closing delimiter '{0}'")]
    EmbedConflict(&'static str),

    #[error("Malformed ledger: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tempfile::PersistError> for TrackError {
    fn from(err: tempfile::PersistError) -> Self {
        TrackError::Io(err.error)
    }
}
