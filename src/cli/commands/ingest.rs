use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::database::Database;
use crate::errors::EngineError;
use crate::processor::MessageProcessor;

#[derive(Debug, Deserialize)]
struct IngestLine {
    text: String,
    timestamp: DateTime<Utc>,
}

/// Process a batch of messages from a newline-delimited JSON file, one
/// `{"text": ..., "timestamp": ...}` record per line.
#[derive(Args)]
pub struct IngestCommand {
    /// Path to the newline-delimited JSON input file
    #[arg(long)]
    input: PathBuf,

    /// Database path (overrides config.toml and environment variables)
    #[arg(long)]
    database_path: Option<PathBuf>,

    /// Stop at the first error instead of continuing with the remaining lines
    #[arg(long)]
    fail_fast: bool,
}

impl IngestCommand {
    pub fn run(&self) -> Result<(), EngineError> {
        let config = EngineConfig::load()?;
        let path = self
            .database_path
            .clone()
            .unwrap_or(config.database.path.clone());

        let database = Database::new(&path.to_string_lossy())?;
        let processor = MessageProcessor::new(database, &config);

        let file = File::open(&self.input)?;
        let reader = BufReader::new(file);

        let mut processed = 0usize;
        let mut failed = 0usize;

        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let record: IngestLine = serde_json::from_str(&line)?;
            match processor.process(&record.text, record.timestamp) {
                Ok(()) => processed += 1,
                Err(e) => {
                    failed += 1;
                    warn!(line = line_number + 1, error = %e, "message failed to process");
                    if self.fail_fast {
                        return Err(EngineError::from(e));
                    }
                }
            }
        }

        info!(processed, failed, "ingest complete");
        Ok(())
    }
}
