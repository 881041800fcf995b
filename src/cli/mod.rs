use clap::{Parser, Subcommand};

use crate::errors::EngineError;

pub mod commands;

/// Message parsing and balance engine for multi-game bank bots.
#[derive(Parser)]
#[command(name = "bankbot-engine")]
#[command(about = "Message parsing and balance engine for multi-game bank bots")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Process a single raw message through the engine
    Process(commands::process::ProcessCommand),
    /// Process a batch of messages from a newline-delimited JSON file
    Ingest(commands::ingest::IngestCommand),
    /// Print a user's bank balance and per-game bot balances
    Balance(commands::balance::BalanceCommand),
    /// Create the database file and apply the schema
    InitDb(commands::init_db::InitDbCommand),
}

pub fn run() -> Result<(), EngineError> {
    // Uses RUST_LOG environment variable (defaults to "error" if not set)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process(command) => command.run(),
        Commands::Ingest(command) => command.run(),
        Commands::Balance(command) => command.run(),
        Commands::InitDb(command) => command.run(),
    }
}
