//! Dashboard mirror - embeds the ledger text inside the HTML dashboard

use crate::config::TrackerConfig;
use crate::error::{TrackError, TrackResult};
use crate::ledger::LedgerStore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const OPEN_DELIMITER: &str = "const csvText = `";
pub const CLOSE_DELIMITER: &str = "`;";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcome {
    Updated,
    Unchanged,
}

impl SyncOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SyncOutcome::Updated => "updated",
            SyncOutcome::Unchanged => "unchanged",
        }
    }
}

/// Keeps the dashboard's embedded CSV in step with the ledger file
pub struct DashboardMirror {
    ledger: LedgerStore,
    path: PathBuf,
}

impl DashboardMirror {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            ledger: LedgerStore::new(config),
            path: config.dashboard_path(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy the current ledger text into the dashboard. Nothing is written
    /// when the embedded region already matches.
    pub fn sync(&self) -> TrackResult<SyncOutcome> {
        let ledger_text = self.ledger.raw_text()?;
        let document = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TrackError::MissingDashboard(self.path.clone()),
            _ => TrackError::Io(e),
        })?;

        let updated = embed(&document, &ledger_text)?;
        if checksum(&updated) == checksum(&document) {
            tracing::debug!(path = %self.path.display(), "dashboard already current");
            return Ok(SyncOutcome::Unchanged);
        }

        self.write(&updated)?;
        tracing::info!(path = %self.path.display(), "dashboard updated");
        Ok(SyncOutcome::Updated)
    }

    fn write(&self, content: &str) -> TrackResult<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut temp_file = NamedTempFile::new_in(&parent)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.flush()?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(&self.path)?;
        Ok(())
    }
}

/// Replace the text between the delimiters with the normalized ledger text
pub fn embed(document: &str, ledger_text: &str) -> TrackResult<String> {
    let payload = ledger_text.trim().replace('\\', "/");
    if payload.contains(CLOSE_DELIMITER) {
        return Err(TrackError::EmbedConflict(CLOSE_DELIMITER));
    }

    let start = document
        .find(OPEN_DELIMITER)
        .map(|pos| pos + OPEN_DELIMITER.len())
        .ok_or(TrackError::DelimiterNotFound(OPEN_DELIMITER))?;
    let end = document[start..]
        .find(CLOSE_DELIMITER)
        .map(|pos| start + pos)
        .ok_or(TrackError::DelimiterNotFound(CLOSE_DELIMITER))?;

    let mut result = String::with_capacity(document.len() + payload.len());
    result.push_str(&document[..start]);
    result.push_str(&payload);
    result.push_str(&document[end..]);
    Ok(result)
}

fn checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}
