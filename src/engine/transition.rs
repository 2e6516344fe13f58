//! Stage Transition Engine

use super::normalize_stored_path;
use crate::config::TrackerConfig;
use crate::error::{TrackError, TrackResult};
use crate::ledger::{Ledger, LedgerStore};
use crate::locator::{file_basename, ArtifactLocator, MoveOutcome};
use crate::models::{company_and_position, LedgerRow, Stage};
use serde::Serialize;
use std::path::PathBuf;

/// What happened to the physical file during a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Moved from the old stage directory to the new one
    Moved,
    /// Found outside the old stage directory and moved into place
    Repaired { from: PathBuf },
    /// Already in the target stage directory
    AlreadyInPlace,
    /// Not found anywhere; only the ledger was updated
    NotFound,
}

impl FileOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            FileOutcome::Moved => "moved",
            FileOutcome::Repaired { .. } => "repaired",
            FileOutcome::AlreadyInPlace => "already_in_place",
            FileOutcome::NotFound => "not_found",
        }
    }
}

/// Outcome of a committed transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionReport {
    pub identity: String,
    pub from: Stage,
    pub to: Stage,
    pub document_path: String,
    pub file: FileOutcome,
    /// The ledger had no row; one was synthesized from the file on disk
    pub row_created: bool,
}

/// Coordinates ledger rows and stage directories for one project
pub struct TransitionEngine<'a> {
    pub(super) config: &'a TrackerConfig,
    store: LedgerStore,
    locator: ArtifactLocator<'a>,
}

impl<'a> TransitionEngine<'a> {
    pub fn new(config: &'a TrackerConfig) -> Self {
        Self {
            config,
            store: LedgerStore::new(config),
            locator: ArtifactLocator::new(config),
        }
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn locator(&self) -> &ArtifactLocator<'a> {
        &self.locator
    }

    /// Move an artifact to `to`: match its ledger row by file base name, move
    /// the file if it can be found, then commit the row. Fails before any
    /// mutation when the artifact is unknown or ambiguous.
    pub fn transition(&self, reference: &str, to: Stage) -> TrackResult<TransitionReport> {
        let identity = self
            .locator
            .identity_for_reference(reference)
            .ok_or_else(|| TrackError::InvalidArtifact(reference.to_string()))?;

        let mut ledger = self.store.load_or_empty()?;
        let (index, row_created) = self.match_row(&mut ledger, &identity, reference)?;

        let from = ledger.rows()[index].stage;
        let recorded = ledger.rows()[index].stage_path(to).to_string();
        tracing::debug!(%identity, %from, %to, "transition started");

        let file = self.relocate(&identity, &recorded, from, to)?;
        if file == FileOutcome::NotFound {
            tracing::warn!(%identity, "artifact file not found, updating ledger only");
        }

        let document_path = self.locator.relative_path(&identity, to);
        ledger.rows_mut()[index].set_stage(to, document_path.clone());
        self.store.save(&ledger)?;

        tracing::info!(%identity, %from, %to, file = file.label(), "transition committed");
        Ok(TransitionReport {
            identity,
            from,
            to,
            document_path,
            file,
            row_created,
        })
    }

    /// Find the unique row for `identity`, synthesizing one when the ledger has
    /// none but the file sits in a stage directory
    fn match_row(
        &self,
        ledger: &mut Ledger,
        identity: &str,
        reference: &str,
    ) -> TrackResult<(usize, bool)> {
        let matches = ledger.find(identity, &self.config.file_prefix);
        match matches.as_slice() {
            [index] => {
                let row = &ledger.rows()[*index];
                match row.unrecognized_at {
                    Some(line) => Err(TrackError::UnknownStatus {
                        status: row.status_text().to_string(),
                        line,
                    }),
                    None => Ok((*index, false)),
                }
            }
            [] => {
                let row = self
                    .synthesize_row(identity)
                    .ok_or_else(|| TrackError::UnknownArtifact(reference.to_string()))?;
                tracing::info!(%identity, stage = %row.stage, "no ledger row, adopting file from disk");
                ledger.push(row);
                Ok((ledger.len() - 1, true))
            }
            many => Err(TrackError::DuplicateArtifact {
                identity: identity.to_string(),
                count: many.len(),
            }),
        }
    }

    /// Build a ledger row for a file found in a stage directory
    pub fn synthesize_row(&self, identity: &str) -> Option<LedgerRow> {
        let stage = self.locator.locate(identity)?;
        let (company, position) = company_and_position(identity);
        let row = LedgerRow::new(
            company,
            position,
            self.locator.relative_path(identity, stage),
            stage,
        )
        .with_notes(format!(
            "Adopted from {}",
            self.config.stage_dir_relative(stage)
        ));
        Some(row)
    }

    /// Best-effort file move. A missing source falls back to the path recorded
    /// for the target stage's column, then to whichever stage directory holds
    /// a file of the target's kind.
    fn relocate(
        &self,
        identity: &str,
        recorded: &str,
        from: Stage,
        to: Stage,
    ) -> TrackResult<FileOutcome> {
        if from != to {
            if let MoveOutcome::Moved = self.locator.move_artifact(identity, from, to)? {
                return Ok(FileOutcome::Moved);
            }
        }

        let target = self.locator.resolve(identity, to);
        if target.is_file() {
            return Ok(FileOutcome::AlreadyInPlace);
        }

        // Recorded path drifted away from the stage directory
        if file_basename(recorded) == self.locator.file_name(identity, to) {
            let drifted = self.config.root.join(normalize_stored_path(recorded));
            if let MoveOutcome::Moved = self.locator.move_path(&drifted, identity, to)? {
                return Ok(FileOutcome::Repaired { from: drifted });
            }
        }

        // Moved out-of-band into another stage directory
        if let Some(found) = self.locator.locate_like(identity, to) {
            let src = self.locator.resolve(identity, found);
            if let MoveOutcome::Moved = self.locator.move_artifact(identity, found, to)? {
                return Ok(FileOutcome::Repaired { from: src });
            }
        }

        Ok(FileOutcome::NotFound)
    }
}
