use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use jobtrack::cli::add::AddArgs;
use jobtrack::{Context, ReconcileOptions, Result, Stage, TrackerConfig};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jobtrack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Job application pipeline tracker", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project root holding the ledger, dashboard and stage directories
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Increase diagnostic output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create stage directories, ledger, config and dashboard
    Init,

    /// Register an application in the ledger
    Add(AddArgs),

    /// List tracked applications
    List {
        /// Only show one stage
        #[arg(short, long)]
        stage: Option<Stage>,
    },

    /// Show counts by company and stage
    Stats,

    /// Move an application to another stage (drafted, ready, applied, skipped)
    Mark {
        /// Artifact file name, path or label
        artifact: String,

        /// Target stage
        stage: Stage,
    },

    /// Compare the ledger with the stage directories
    Reconcile {
        /// Move misplaced files and rewrite drifted paths
        #[arg(long)]
        fix: bool,

        /// Add ledger rows for untracked files
        #[arg(long)]
        adopt: bool,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// Copy the ledger into the dashboard page
    #[command(name = "sync-dashboard")]
    SyncDashboard,

    /// Rewrite the ledger with the current header layout
    Migrate,

    /// Run the local HTTP server used by the dashboard
    Serve {
        /// Port to listen on (default from jobtrack.toml)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve { .. } if cli.verbose == 0 => "info",
        _ => jobtrack::logging::level_for_verbosity(cli.verbose),
    };
    jobtrack::logging::init(default_level);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{}", format!("Error: failed to start runtime: {}", e).red());
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run_async(cli)) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

async fn run_async(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        generate(shell, &mut Cli::command(), "jobtrack", &mut io::stdout());
        return Ok(());
    }

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let config = TrackerConfig::load(&root)
        .with_context(|| format!("Failed to load configuration from {}", root.display()))?;

    match cli.command {
        Commands::Init => {
            println!("{}", "🚀 Initializing job tracker...".cyan());
            jobtrack::cli::init::run(&config)?;
        }

        Commands::Add(args) => jobtrack::cli::add::run(&config, args)?,

        Commands::List { stage } => jobtrack::cli::list::run(&config, stage)?,

        Commands::Stats => jobtrack::cli::list::run_stats(&config)?,

        Commands::Mark { artifact, stage } => {
            println!("{}", format!("📦 Marking {} as {}", artifact, stage).cyan());
            jobtrack::cli::mark::run(&config, &artifact, stage)?;
        }

        Commands::Reconcile { fix, adopt, json } => {
            jobtrack::cli::reconcile::run(&config, ReconcileOptions { fix, adopt }, json)?;
        }

        Commands::SyncDashboard => jobtrack::cli::dashboard::run(&config)?,

        Commands::Migrate => jobtrack::cli::migrate::run(&config)?,

        Commands::Serve { port } => jobtrack::cli::server::run(config, port).await?,

        Commands::Completions { .. } => {}
    }

    Ok(())
}
