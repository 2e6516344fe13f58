use crate::config::TrackerConfig;
use crate::dashboard::DashboardMirror;
use crate::engine::{FileOutcome, TransitionEngine};
use crate::models::Stage;
use crate::Result;
use colored::Colorize;

pub fn run(config: &TrackerConfig, artifact: &str, stage: Stage) -> Result<()> {
    let report = TransitionEngine::new(config).transition(artifact, stage)?;

    if report.row_created {
        println!(
            "{}",
            format!("➕ No ledger row for '{}', adopted it from disk", report.identity).yellow()
        );
    }

    match &report.file {
        FileOutcome::Moved => println!("   ✓ Moved to {}", report.document_path),
        FileOutcome::Repaired { from } => {
            println!("   ✓ Moved {} → {}", from.display(), report.document_path)
        }
        FileOutcome::AlreadyInPlace => println!("   • Already at {}", report.document_path),
        FileOutcome::NotFound => println!(
            "{}",
            "   ⚠️  File not found on disk; ledger updated only".yellow()
        ),
    }

    println!(
        "{}",
        format!(
            "✅ {}: {} → {} {}",
            report.identity,
            report.from,
            report.to.emoji(),
            report.to
        )
        .green()
    );

    // The transition is committed; a stale dashboard is only a warning
    match DashboardMirror::new(config).sync() {
        Ok(outcome) => println!("   Dashboard {}", outcome.label()),
        Err(e) => println!("{}", format!("⚠️  Dashboard not updated: {}", e).yellow()),
    }
    Ok(())
}
