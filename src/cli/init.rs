use crate::config::{TrackerConfig, CONFIG_FILE};
use crate::dashboard::DashboardMirror;
use crate::ledger::{Ledger, LedgerStore};
use crate::models::Stage;
use crate::Result;
use colored::Colorize;
use std::fs;

const DASHBOARD_TEMPLATE: &str = include_str!("../../templates/dashboard.html");

/// Create stage directories, an empty ledger, the config file and a starter
/// dashboard. Existing files are left alone.
pub fn run(config: &TrackerConfig) -> Result<()> {
    println!("{}", "📁 Stage directories".cyan());
    for stage in Stage::ALL {
        let dir = config.stage_dir(stage);
        if dir.is_dir() {
            println!("   • {} {}", config.stage_dir_relative(stage), "(exists)".bright_black());
        } else {
            fs::create_dir_all(&dir)?;
            println!("   ✓ {}", config.stage_dir_relative(stage));
        }
    }

    println!("{}", "📄 Project files".cyan());
    let store = LedgerStore::new(config);
    if store.exists() {
        println!("   • {} {}", config.ledger, "(exists)".bright_black());
    } else {
        store.save(&Ledger::empty())?;
        println!("   ✓ {}", config.ledger);
    }

    if config.root.join(CONFIG_FILE).exists() {
        println!("   • {} {}", CONFIG_FILE, "(exists)".bright_black());
    } else {
        config.save()?;
        println!("   ✓ {}", CONFIG_FILE);
    }

    let dashboard = config.dashboard_path();
    if dashboard.exists() {
        println!("   • {} {}", config.dashboard, "(exists)".bright_black());
    } else {
        fs::write(&dashboard, DASHBOARD_TEMPLATE)?;
        DashboardMirror::new(config).sync()?;
        println!("   ✓ {}", config.dashboard);
    }

    println!();
    println!("{}", "✅ Tracker initialized".green().bold());
    Ok(())
}
