pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::error::Result;

#[derive(Parser)]
#[command(name = "rigup")]
#[command(version)]
#[command(about = "Idempotent build-machine provisioning")]
#[command(
    long_about = "Install compilers, build tools and a CI worker on this host.\n\nEverything already present is skipped; re-running a finished provisioning pass is a no-op."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize rigup configuration
    Init,

    /// Install everything from this host's tool catalog
    Provision {
        /// Tool id to skip (repeatable)
        #[arg(long)]
        skip: Vec<String>,

        /// Print the plan without touching the host
        #[arg(long)]
        dry_run: bool,
    },

    /// Show which catalog tools are present on this host
    Status,

    /// List the tool catalog for this host
    Tools,

    /// Manage the CI worker
    Worker {
        #[command(subcommand)]
        command: WorkerCommands,
    },
}

#[derive(Subcommand)]
pub enum WorkerCommands {
    /// Write the worker config and register it for autostart
    Install,

    /// Start the worker once, in the foreground
    Start,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Init => commands::init::execute().await,
            Commands::Provision { skip, dry_run } => {
                let config = AppConfig::load()?;
                commands::provision::execute(&config, skip, dry_run).await
            }
            Commands::Status => commands::status::execute().await,
            Commands::Tools => commands::tools::execute().await,
            Commands::Worker { command } => {
                let config = AppConfig::load()?;
                match command {
                    WorkerCommands::Install => commands::worker::install(&config).await,
                    WorkerCommands::Start => commands::worker::start(&config).await,
                }
            }
        }
    }
}
