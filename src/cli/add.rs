use crate::config::TrackerConfig;
use crate::dashboard::DashboardMirror;
use crate::ledger::LedgerStore;
use crate::locator::ArtifactLocator;
use crate::models::{company_and_position, LedgerRow, Stage, MANUAL_ENTRY};
use crate::Result;
use anyhow::{anyhow, bail};
use clap::Args;
use colored::Colorize;
use dialoguer::Input;

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Artifact label or file name (e.g. `acme-swe`); omit for a manual entry
    pub label: Option<String>,

    /// Company name (derived from the label when omitted)
    #[arg(long)]
    pub company: Option<String>,

    /// Position title (derived from the label when omitted)
    #[arg(long)]
    pub position: Option<String>,

    /// Stage to record the application in
    #[arg(long, default_value = "ready")]
    pub stage: Stage,

    #[arg(long)]
    pub notes: Option<String>,

    /// Prompt for anything not given on the command line
    #[arg(short, long)]
    pub interactive: bool,
}

pub fn run(config: &TrackerConfig, args: AddArgs) -> Result<()> {
    let row = build_row(config, args)?;
    LedgerStore::new(config).append(&row)?;

    println!(
        "{}",
        format!(
            "✅ Added {} - {} ({} {})",
            row.company,
            row.position,
            row.stage.emoji(),
            row.stage
        )
        .green()
    );

    if let Err(e) = DashboardMirror::new(config).sync() {
        println!("{}", format!("⚠️  Dashboard not updated: {}", e).yellow());
    }
    Ok(())
}

/// Build the row to append, refusing an identity the ledger already tracks
pub fn build_row(config: &TrackerConfig, args: AddArgs) -> Result<LedgerRow> {
    let locator = ArtifactLocator::new(config);

    let identity = match args.label.as_deref() {
        Some(label) => Some(
            locator
                .identity_for_reference(label)
                .ok_or_else(|| anyhow!("Invalid artifact label: '{}'", label))?,
        ),
        None => None,
    };

    if let Some(identity) = &identity {
        let ledger = LedgerStore::new(config).load_or_empty()?;
        if !ledger.find(identity, &config.file_prefix).is_empty() {
            bail!(
                "'{}' is already tracked; use `jobtrack mark {} <stage>` to move it",
                identity,
                identity
            );
        }
    }

    let (derived_company, derived_position) = identity
        .as_deref()
        .map(company_and_position)
        .unwrap_or_default();
    let company = resolve_field(args.company, derived_company, "Company", args.interactive)?;
    let position = resolve_field(args.position, derived_position, "Position", args.interactive)?;

    let notes = match args.notes {
        Some(notes) => notes,
        None if args.interactive => Input::<String>::new()
            .with_prompt("Notes (optional)")
            .allow_empty(true)
            .interact_text()?,
        None => String::new(),
    };

    let row = match identity {
        Some(identity) => LedgerRow::new(
            company,
            position,
            locator.relative_path(&identity, args.stage),
            args.stage,
        ),
        None => LedgerRow::new(company, position, MANUAL_ENTRY, args.stage).with_source(MANUAL_ENTRY),
    };
    Ok(row.with_notes(notes))
}

/// Explicit value, else a prompt (interactive), else the derived value
fn resolve_field(
    explicit: Option<String>,
    derived: String,
    prompt: &str,
    interactive: bool,
) -> Result<String> {
    let value = match explicit {
        Some(value) => value,
        None if interactive => {
            let mut input = Input::<String>::new().with_prompt(prompt);
            if !derived.is_empty() {
                input = input.default(derived);
            }
            input.interact_text()?
        }
        None => derived,
    };

    let value = value.trim().to_string();
    if value.is_empty() {
        bail!("{} is required for a manual entry", prompt);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(label: Option<&str>) -> AddArgs {
        AddArgs {
            label: label.map(String::from),
            company: None,
            position: None,
            stage: Stage::Ready,
            notes: None,
            interactive: false,
        }
    }

    #[test]
    fn test_row_from_label() {
        let temp = TempDir::new().unwrap();
        let config = TrackerConfig::with_root(temp.path());

        let row = build_row(&config, args(Some("Acme SWE"))).unwrap();
        assert_eq!(row.company, "Acme");
        assert_eq!(row.position, "Swe");
        assert_eq!(row.document_path, "Resume/To_Apply/resume_acme-swe.pdf");
        assert_eq!(row.stage, Stage::Ready);
    }

    #[test]
    fn test_manual_entry_requires_company() {
        let temp = TempDir::new().unwrap();
        let config = TrackerConfig::with_root(temp.path());
        assert!(build_row(&config, args(None)).is_err());

        let mut manual = args(None);
        manual.company = Some("Globex".into());
        manual.position = Some("Data Engineer".into());
        manual.stage = Stage::Applied;
        let row = build_row(&config, manual).unwrap();
        assert_eq!(row.document_path, MANUAL_ENTRY);
        assert_eq!(row.source_path, MANUAL_ENTRY);
    }

    #[test]
    fn test_refuses_tracked_identity() {
        let temp = TempDir::new().unwrap();
        let config = TrackerConfig::with_root(temp.path());
        fs::write(
            config.ledger_path(),
            "Date,Time,Company,Position,HTML_Path,PDF_Path,Status,Notes\n\
             ,,Acme,Swe,,Resume/To_Apply/resume_acme-swe.pdf,Ready,\n",
        )
        .unwrap();

        let err = build_row(&config, args(Some("resume_acme-swe.pdf"))).unwrap_err();
        assert!(err.to_string().contains("already tracked"));
    }
}
