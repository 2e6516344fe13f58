use crate::config::TrackerConfig;
use crate::Result;
use colored::Colorize;

pub async fn run(config: TrackerConfig, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.server.port);
    println!("{}", "🌐 Starting job tracker server".cyan());
    println!("   Root: {}", config.root.display());
    crate::server::start_server(config, port).await
}
