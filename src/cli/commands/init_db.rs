use clap::Args;
use tracing::info;

use crate::config::EngineConfig;
use crate::database::Database;
use crate::errors::EngineResult;

/// Create the database file and apply the schema, without processing any
/// messages.
#[derive(Args)]
pub struct InitDbCommand {
    /// Database path (overrides config.toml and environment variables)
    #[arg(long)]
    database_path: Option<std::path::PathBuf>,
}

impl InitDbCommand {
    pub fn run(&self) -> EngineResult<()> {
        let config = EngineConfig::load()?;
        let path = self
            .database_path
            .clone()
            .unwrap_or(config.database.path.clone());

        Database::new(&path.to_string_lossy())?;
        info!(path = %path.display(), "schema applied");
        Ok(())
    }
}
