//! Knowledge Hub CLI
//!
//! Main entry point for the khub command-line tool.
//! Runs the HTTP gateway, answers one-off questions and manages resources.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ResourcesCommand, ServeCommand};
use khub_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Knowledge Hub - grounded answers over ingested domains
#[derive(Parser, Debug)]
#[command(name = "khub")]
#[command(
    about = "Retrieval-augmented question answering over knowledge domains",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Path to config file (default: ./khub.yaml when present)
    #[arg(short, long, global = true, env = "kh_config")]
    config: Option<PathBuf>,

    /// PostgreSQL connection string
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Weaviate base URL
    #[arg(long, global = true)]
    weaviate_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP gateway
    Serve(ServeCommand),

    /// Answer a single question against a domain
    Ask(AskCommand),

    /// Inspect and advance resources
    Resources(ResourcesCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Defaults, then config file, then environment
    let config = AppConfig::load(cli.config.as_deref())?;

    // Apply CLI overrides
    let port = match &cli.command {
        Commands::Serve(cmd) => cmd.port,
        _ => None,
    };
    let config = config.with_overrides(
        cli.database_url,
        cli.weaviate_url,
        port,
        cli.log_level,
        cli.log_json,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_json)?;
    config.validate()?;

    tracing::info!("Knowledge Hub starting");
    tracing::debug!(config_file = ?config.config_file, "Configuration loaded");

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Ask(_) => "ask",
        Commands::Resources(_) => "resources",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Resources(cmd) => cmd.execute(&config).await,
    };

    // Log completion
    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
