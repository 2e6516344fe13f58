use crate::config::TrackerConfig;
use crate::dashboard::{DashboardMirror, SyncOutcome};
use crate::Result;
use colored::Colorize;

pub fn run(config: &TrackerConfig) -> Result<()> {
    println!("{}", "🔄 Updating dashboard...".cyan());
    match DashboardMirror::new(config).sync()? {
        SyncOutcome::Updated => println!("{}", "✅ Dashboard updated".green()),
        SyncOutcome::Unchanged => println!("{}", "• Dashboard already current".bright_black()),
    }
    Ok(())
}
