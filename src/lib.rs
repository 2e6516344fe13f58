// jobtrack - Job application pipeline tracker
// Keeps a CSV ledger, stage directories and an HTML dashboard in agreement

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod locator;
pub mod logging;
pub mod models;
pub mod server;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use config::TrackerConfig;
pub use dashboard::{DashboardMirror, SyncOutcome};
pub use engine::{FileOutcome, Finding, ReconcileOptions, ReconcileReport, TransitionEngine, TransitionReport};
pub use error::{TrackError, TrackResult};
pub use ledger::{Ledger, LedgerStore};
pub use locator::{ArtifactLocator, MoveOutcome};
pub use models::{LedgerRow, Stage};
