//! Coastwatch CLI - zero-shot coastal pollution classification.
//!
//! Takes a coastal photograph and reports which pollution category it
//! depicts, with a calibrated confidence and any geolocation embedded in
//! the image's metadata.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a single image
//! coastwatch analyze beach.jpg
//!
//! # View configuration
//! coastwatch config show
//!
//! # Manage models
//! coastwatch models download
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Coastwatch - zero-shot coastal pollution classification.
#[derive(Parser, Debug)]
#[command(name = "coastwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify pollution in images and extract geotags
    Analyze(cli::analyze::AnalyzeArgs),

    /// Manage AI models (download, list, etc.)
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match coastwatch_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `coastwatch config path`."
            );
            coastwatch_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Coastwatch v{}", coastwatch_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Analyze(args) => cli::analyze::execute(args).await,
        Commands::Models(args) => cli::models::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
