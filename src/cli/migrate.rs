use crate::config::TrackerConfig;
use crate::ledger::LedgerStore;
use crate::Result;
use colored::Colorize;

/// Rewrite the ledger under the canonical header
pub fn run(config: &TrackerConfig) -> Result<()> {
    let store = LedgerStore::new(config);
    let mut ledger = store.load()?;

    if !ledger.migrate() {
        println!("{}", "• Ledger already uses the current layout".bright_black());
        return Ok(());
    }

    store.save(&ledger)?;
    println!(
        "{}",
        format!("✅ Migrated {} rows to the current layout", ledger.len()).green()
    );
    println!("   {}", ledger.schema().header().join(",").bright_black());
    Ok(())
}
