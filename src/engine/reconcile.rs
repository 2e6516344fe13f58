//! Reconciliation sweep - detect and repair torn ledger/filesystem state

use super::normalize_stored_path;
use super::TransitionEngine;
use crate::error::TrackResult;
use crate::locator::{file_basename, MoveOutcome};
use crate::models::Stage;
use serde::Serialize;
use std::collections::BTreeSet;

/// A disagreement between a ledger row and the stage directories
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// The path recorded for the row's stage (source column for drafts,
    /// document column otherwise) is not the canonical one
    PathDrift {
        identity: String,
        recorded: String,
        expected: String,
    },
    /// The file lives in another stage directory than the ledger says
    Misplaced {
        identity: String,
        stage: Stage,
        found_in: Stage,
    },
    /// The file is in no stage directory
    Missing { identity: String, stage: Stage },
    /// Several rows share one identity; left untouched
    Duplicate { identity: String, count: usize },
    /// A stage directory holds a file the ledger does not know
    Orphan { identity: String, stage: Stage },
}

impl Finding {
    pub fn identity(&self) -> &str {
        match self {
            Finding::PathDrift { identity, .. }
            | Finding::Misplaced { identity, .. }
            | Finding::Missing { identity, .. }
            | Finding::Duplicate { identity, .. }
            | Finding::Orphan { identity, .. } => identity,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Move misplaced files and rewrite drifted paths
    pub fix: bool,
    /// Add ledger rows for orphan files
    pub adopt: bool,
}

/// Result of a reconciliation sweep
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    /// Rows with an identity that were checked
    pub checked: usize,
    /// Rows without an identity (manual entries) or with an unrecognized status
    pub untracked: usize,
    pub findings: Vec<Finding>,
    /// Findings repaired in this run
    pub fixed: usize,
    /// Orphans added to the ledger in this run
    pub adopted: usize,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

impl TransitionEngine<'_> {
    /// Compare every row against the stage directories, optionally repairing
    /// what can be repaired. Ledger status always wins; files follow it.
    pub fn reconcile(&self, options: ReconcileOptions) -> TrackResult<ReconcileReport> {
        let prefix = self.config.file_prefix.as_str();
        let mut ledger = self.store().load_or_empty()?;
        let mut report = ReconcileReport::default();
        let mut changed = false;

        let duplicates = ledger.duplicates(prefix);
        let duplicate_ids: BTreeSet<String> =
            duplicates.iter().map(|(identity, _)| identity.clone()).collect();
        for (identity, count) in duplicates {
            report.findings.push(Finding::Duplicate { identity, count });
        }

        let mut known = BTreeSet::new();
        for row in ledger.rows_mut() {
            let Some(identity) = row.identity(prefix) else {
                report.untracked += 1;
                continue;
            };
            known.insert(identity.clone());
            let Some(stage) = row.known_stage() else {
                tracing::debug!(%identity, status = row.status_text(), "unrecognized status, not checked");
                report.untracked += 1;
                continue;
            };
            if duplicate_ids.contains(&identity) {
                continue;
            }
            report.checked += 1;

            let expected = self.locator().relative_path(&identity, stage);
            let recorded = row.stage_path(stage).to_string();
            if normalize_stored_path(&recorded) != expected {
                report.findings.push(Finding::PathDrift {
                    identity: identity.clone(),
                    recorded: recorded.clone(),
                    expected: expected.clone(),
                });
                if options.fix {
                    if file_basename(&recorded) == self.locator().file_name(&identity, stage) {
                        let drifted = self.config.root.join(normalize_stored_path(&recorded));
                        if let MoveOutcome::Moved =
                            self.locator().move_path(&drifted, &identity, stage)?
                        {
                            tracing::info!(%identity, "moved drifted file into stage directory");
                        }
                    }
                    row.set_stage(stage, expected.clone());
                    changed = true;
                    report.fixed += 1;
                }
            }

            if self.locator().resolve(&identity, stage).is_file() {
                continue;
            }
            match self.locator().locate_like(&identity, stage) {
                Some(found_in) => {
                    report.findings.push(Finding::Misplaced {
                        identity: identity.clone(),
                        stage,
                        found_in,
                    });
                    if options.fix
                        && self.locator().move_artifact(&identity, found_in, stage)?
                            == MoveOutcome::Moved
                    {
                        report.fixed += 1;
                    }
                }
                None => report.findings.push(Finding::Missing { identity, stage }),
            }
        }

        for stage in Stage::ALL {
            for (identity, _) in self.locator().stage_files(stage) {
                if known.contains(&identity) {
                    continue;
                }
                if options.adopt {
                    if let Some(row) = self.synthesize_row(&identity) {
                        ledger.push(row);
                        changed = true;
                        report.adopted += 1;
                    }
                }
                report.findings.push(Finding::Orphan {
                    identity: identity.clone(),
                    stage,
                });
                known.insert(identity);
            }
        }

        if changed {
            self.store().save(&ledger)?;
            tracing::info!(fixed = report.fixed, adopted = report.adopted, "ledger reconciled");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use std::fs;
    use tempfile::TempDir;

    const LEDGER: &str = "Date,Time,Company,Position,HTML_Path,PDF_Path,Status,Notes\n\
2025-02-01,09:00:00,Acme,Swe,,Resume/To_Apply/resume_acme-swe.pdf,Ready,\n\
2025-02-02,09:00:00,Globex,Ml,,../Resume/HTMLs/resume_globex-ml.pdf,Applied,\n\
2025-02-03,09:00:00,Hooli,Sre,,Resume/Skipped/resume_hooli-sre.pdf,Skipped,\n\
2025-02-04,09:00:00,Manual,Entry,Manual Entry,Manual Entry,Applied,\n";

    fn setup() -> (TempDir, TrackerConfig) {
        let temp = TempDir::new().unwrap();
        let config = TrackerConfig::with_root(temp.path());
        fs::write(config.ledger_path(), LEDGER).unwrap();
        for rel in [
            "Resume/Applied/resume_acme-swe.pdf",
            "Resume/HTMLs/resume_globex-ml.pdf",
            "Resume/Drafts/resume_umbrella-pm.html",
        ] {
            let path = temp.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"%PDF").unwrap();
        }
        (temp, config)
    }

    #[test]
    fn test_report_only() {
        let (_temp, config) = setup();
        let engine = TransitionEngine::new(&config);
        let report = engine.reconcile(ReconcileOptions::default()).unwrap();

        assert_eq!(report.checked, 3);
        assert_eq!(report.untracked, 1);
        assert!(report.findings.contains(&Finding::Misplaced {
            identity: "acme-swe".to_string(),
            stage: Stage::Ready,
            found_in: Stage::Applied,
        }));
        assert!(report
            .findings
            .iter()
            .any(|f| matches!(f, Finding::PathDrift { identity, .. } if identity == "globex-ml")));
        assert!(report.findings.contains(&Finding::Missing {
            identity: "hooli-sre".to_string(),
            stage: Stage::Skipped,
        }));
        assert!(report.findings.contains(&Finding::Orphan {
            identity: "umbrella-pm".to_string(),
            stage: Stage::Drafted,
        }));
        assert_eq!(fs::read_to_string(config.ledger_path()).unwrap(), LEDGER);
    }

    #[test]
    fn test_fix_and_adopt() {
        let (temp, config) = setup();
        let engine = TransitionEngine::new(&config);
        let report = engine
            .reconcile(ReconcileOptions {
                fix: true,
                adopt: true,
            })
            .unwrap();
        assert_eq!(report.adopted, 1);

        // Ledger wins: the file goes back to To_Apply
        assert!(temp.path().join("Resume/To_Apply/resume_acme-swe.pdf").is_file());
        assert!(temp.path().join("Resume/Applied/resume_globex-ml.pdf").is_file());

        let ledger = engine.store().load().unwrap();
        assert_eq!(ledger.len(), 5);
        assert_eq!(ledger.rows()[1].document_path, "Resume/Applied/resume_globex-ml.pdf");
        assert_eq!(ledger.rows()[4].stage, Stage::Drafted);
        assert_eq!(ledger.rows()[4].source_path, "Resume/Drafts/resume_umbrella-pm.html");

        let again = engine.reconcile(ReconcileOptions::default()).unwrap();
        assert_eq!(
            again.findings,
            vec![Finding::Missing {
                identity: "hooli-sre".to_string(),
                stage: Stage::Skipped,
            }]
        );
    }

    #[test]
    fn test_drafted_row_with_html_is_clean() {
        let temp = TempDir::new().unwrap();
        let config = TrackerConfig::with_root(temp.path());
        let csv = "Date,Time,Company,Position,HTML_Path,PDF_Path,Status,Notes\n\
2025-02-01,09:00:00,Acme,Swe,Resume/Drafts/resume_acme-swe.html,,Drafted,\n";
        fs::write(config.ledger_path(), csv).unwrap();
        let draft = temp.path().join("Resume/Drafts/resume_acme-swe.html");
        fs::create_dir_all(draft.parent().unwrap()).unwrap();
        fs::write(&draft, b"<html>").unwrap();

        let engine = TransitionEngine::new(&config);
        let report = engine
            .reconcile(ReconcileOptions {
                fix: true,
                adopt: true,
            })
            .unwrap();
        assert_eq!(report.checked, 1);
        assert!(report.is_clean(), "{:?}", report.findings);
        assert_eq!(fs::read_to_string(config.ledger_path()).unwrap(), csv);
        assert!(draft.is_file());
    }

    #[test]
    fn test_unrecognized_status_counts_as_untracked() {
        let temp = TempDir::new().unwrap();
        let config = TrackerConfig::with_root(temp.path());
        let csv = "Date,Time,Company,Position,HTML_Path,PDF_Path,Status,Notes\n\
2025-02-01,09:00:00,Acme,Swe,,Resume/To_Apply/resume_acme-swe.pdf,Interview,\n";
        fs::write(config.ledger_path(), csv).unwrap();
        let file = temp.path().join("Resume/Applied/resume_acme-swe.pdf");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, b"%PDF").unwrap();

        let engine = TransitionEngine::new(&config);
        let report = engine
            .reconcile(ReconcileOptions {
                fix: true,
                adopt: true,
            })
            .unwrap();
        assert_eq!(report.untracked, 1);
        assert_eq!(report.checked, 0);
        // Known identity, so the file is not an orphan either
        assert!(report.is_clean(), "{:?}", report.findings);
        assert_eq!(fs::read_to_string(config.ledger_path()).unwrap(), csv);
        assert!(file.is_file());
    }
}
