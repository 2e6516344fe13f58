use crate::config::TrackerConfig;
use crate::error::TrackError;
use crate::ledger::{Ledger, LedgerStore};
use crate::models::{Stage, DATE_FORMAT};
use crate::Result;
use chrono::{Local, NaiveDate};
use colored::Colorize;
use std::collections::BTreeMap;

/// Load the ledger, or print a hint and return `None` when there is none yet
fn load(config: &TrackerConfig) -> Result<Option<Ledger>> {
    match LedgerStore::new(config).load() {
        Ok(ledger) => Ok(Some(ledger)),
        Err(TrackError::MissingLedger(_)) => {
            println!("{}", "📄 No applications tracked yet. Run 'jobtrack init' first.".yellow());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn run(config: &TrackerConfig, stage: Option<Stage>) -> Result<()> {
    let Some(ledger) = load(config)? else {
        return Ok(());
    };

    let rows: Vec<_> = ledger
        .rows()
        .iter()
        .filter(|row| stage.map_or(true, |s| row.known_stage() == Some(s)))
        .collect();

    if rows.is_empty() {
        println!("{}", "📄 No applications found.".yellow());
        return Ok(());
    }

    println!("{}", "📊 Job applications".cyan().bold());
    for (i, row) in rows.iter().enumerate() {
        println!();
        println!(
            "{}. {} - {}",
            i + 1,
            row.company.bold(),
            row.position
        );
        println!("   📅 {} {}", row.date, row.time);
        match row.known_stage() {
            Some(stage) => println!("   {} {}", stage.emoji(), stage_label(stage)),
            None => println!("   ❓ {}", row.status_text().bright_black()),
        }
        if !row.document_path.is_empty() {
            println!("   📄 {}", row.document_path.bright_black());
        }
        if !row.notes.is_empty() {
            println!("   📝 {}", row.notes);
        }
    }

    println!();
    println!("Total: {}", rows.len());
    Ok(())
}

fn stage_label(stage: Stage) -> colored::ColoredString {
    match stage {
        Stage::Drafted => stage.name().bright_black(),
        Stage::Ready => stage.name().yellow(),
        Stage::Applied => stage.name().green(),
        Stage::Skipped => stage.name().red(),
    }
}

/// Aggregate counts over the ledger
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LedgerStats {
    pub total: usize,
    pub by_company: BTreeMap<String, usize>,
    pub by_stage: BTreeMap<Stage, usize>,
    /// Rows whose status matches no stage, keyed by the status text
    pub unrecognized: BTreeMap<String, usize>,
    /// Rows recorded on the reference day
    pub today: usize,
}

impl LedgerStats {
    pub fn compute(ledger: &Ledger, today: NaiveDate) -> Self {
        let today = today.format(DATE_FORMAT).to_string();
        let mut stats = LedgerStats::default();
        for row in ledger.rows() {
            stats.total += 1;
            *stats.by_company.entry(row.company.clone()).or_default() += 1;
            match row.known_stage() {
                Some(stage) => *stats.by_stage.entry(stage).or_default() += 1,
                None => *stats.unrecognized.entry(row.status_text().to_string()).or_default() += 1,
            }
            if row.date.trim() == today {
                stats.today += 1;
            }
        }
        stats
    }
}

pub fn run_stats(config: &TrackerConfig) -> Result<()> {
    let Some(ledger) = load(config)? else {
        return Ok(());
    };
    let stats = LedgerStats::compute(&ledger, Local::now().date_naive());

    println!("{}", "📈 Application statistics".cyan().bold());
    println!("   Total applications: {}", stats.total);
    println!("   Unique companies:   {}", stats.by_company.len());
    if stats.today > 0 {
        println!("   Today's activity:   {}", stats.today);
    }

    println!();
    println!("{}", "🏢 By company:".green());
    for (company, count) in &stats.by_company {
        println!("   {}: {}", company, count);
    }

    println!();
    println!("{}", "📊 By stage:".green());
    for (stage, count) in &stats.by_stage {
        println!("   {} {}: {}", stage.emoji(), stage_label(*stage), count);
    }
    for (status, count) in &stats.unrecognized {
        println!("   ❓ {}: {}", status.bright_black(), count);
    }
    Ok(())
}
