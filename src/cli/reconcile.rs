use crate::config::TrackerConfig;
use crate::dashboard::DashboardMirror;
use crate::engine::{Finding, ReconcileOptions, TransitionEngine};
use crate::Result;
use colored::Colorize;

pub fn run(config: &TrackerConfig, options: ReconcileOptions, json: bool) -> Result<()> {
    let report = TransitionEngine::new(config).reconcile(options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "🔍 Reconciling ledger with stage directories".cyan());
    println!(
        "   Checked {} rows ({} manual entries skipped)",
        report.checked, report.untracked
    );

    if report.is_clean() {
        println!("{}", "✅ Ledger and files agree".green());
        return Ok(());
    }

    println!();
    for finding in &report.findings {
        println!("   {}", describe(finding));
    }

    println!();
    if options.fix || options.adopt {
        println!(
            "{}",
            format!("✓ Fixed {}, adopted {}", report.fixed, report.adopted).green()
        );
        if report.fixed + report.adopted > 0 {
            if let Err(e) = DashboardMirror::new(config).sync() {
                println!("{}", format!("⚠️  Dashboard not updated: {}", e).yellow());
            }
        }
    } else {
        println!(
            "{}",
            "Run with --fix to move files and rewrite paths, --adopt to track orphans".bright_black()
        );
    }
    Ok(())
}

fn describe(finding: &Finding) -> String {
    match finding {
        Finding::PathDrift {
            identity,
            recorded,
            expected,
        } => format!(
            "{} {}: path {} should be {}",
            "drift".yellow(),
            identity,
            recorded,
            expected
        ),
        Finding::Misplaced {
            identity,
            stage,
            found_in,
        } => format!(
            "{} {}: ledger says {}, file is in {}",
            "misplaced".yellow(),
            identity,
            stage,
            found_in
        ),
        Finding::Missing { identity, stage } => format!(
            "{} {}: no file in any stage directory (ledger: {})",
            "missing".red(),
            identity,
            stage
        ),
        Finding::Duplicate { identity, count } => format!(
            "{} {}: {} ledger rows, fix by hand",
            "duplicate".red(),
            identity,
            count
        ),
        Finding::Orphan { identity, stage } => format!(
            "{} {}: file in {} has no ledger row",
            "orphan".cyan(),
            identity,
            stage
        ),
    }
}
