use chrono::{DateTime, Utc};
use clap::Args;
use tracing::info;

use crate::config::EngineConfig;
use crate::database::Database;
use crate::errors::EngineError;
use crate::processor::MessageProcessor;

/// Process a single raw message through the engine.
#[derive(Args)]
pub struct ProcessCommand {
    /// Raw message text exactly as observed from the source bot
    #[arg(long)]
    text: String,

    /// RFC3339 timestamp deterministic with respect to the source event
    /// (e.g. the broker's delivery timestamp), not wall-clock at ingestion
    #[arg(long)]
    timestamp: DateTime<Utc>,

    /// Database path (overrides config.toml and environment variables)
    #[arg(long)]
    database_path: Option<std::path::PathBuf>,
}

impl ProcessCommand {
    pub fn run(&self) -> Result<(), EngineError> {
        let config = EngineConfig::load()?;
        let path = self
            .database_path
            .clone()
            .unwrap_or(config.database.path.clone());

        let database = Database::new(&path.to_string_lossy())?;
        let processor = MessageProcessor::new(database, &config);

        processor
            .process(&self.text, self.timestamp)
            .map_err(EngineError::from)?;

        info!(timestamp = %self.timestamp.to_rfc3339(), "message processed");
        Ok(())
    }
}
