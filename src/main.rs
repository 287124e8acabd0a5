//! Aspire takeoff data-entry automation.
//!
//! Main entry point for the takeoff CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use takeoff_config::ConfigLoader;

mod flows;
mod logging;
mod netlog;

/// Takeoff CLI.
#[derive(Parser)]
#[command(name = "takeoff")]
#[command(about = "Aspire takeoff data-entry automation")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    config: PathBuf,

    /// Record page API traffic to api_logs_<timestamp>.txt
    #[arg(long, global = true)]
    capture_api_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the property takeoff table and fill takeoff values back
    Property,

    /// Drive the estimation screen import with the LLM agent
    Estimation,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Secrets arrive via the environment; a local .env is optional.
    dotenvy::dotenv().ok();
    logging::init_tracing()?;

    let cli = Cli::parse();

    info!("Starting takeoff v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {}", cli.config.display());

    let config = ConfigLoader::load(&cli.config)?;
    config.validate()?;

    let result = match cli.command {
        Commands::Property => flows::run_property(&config, cli.capture_api_log).await,
        Commands::Estimation => flows::run_estimation(&config, cli.capture_api_log).await,
    };

    if let Err(e) = &result {
        error!(error = %e, "flow failed");
    }
    result
}
