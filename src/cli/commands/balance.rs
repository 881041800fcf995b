use clap::Args;

use crate::config::EngineConfig;
use crate::database::Database;
use crate::errors::EngineError;
use crate::processor::MessageProcessor;

/// Print a user's bank balance and per-game bot balances.
#[derive(Args)]
pub struct BalanceCommand {
    /// Player name, exactly as it appears in parsed messages (case-sensitive)
    #[arg(long)]
    user: String,

    /// Database path (overrides config.toml and environment variables)
    #[arg(long)]
    database_path: Option<std::path::PathBuf>,
}

impl BalanceCommand {
    pub fn run(&self) -> Result<(), EngineError> {
        let config = EngineConfig::load()?;
        let path = self
            .database_path
            .clone()
            .unwrap_or(config.database.path.clone());

        let database = Database::new(&path.to_string_lossy())?;
        let processor = MessageProcessor::new(database, &config);
        let found = processor.inspect_user(&self.user)?;

        match found {
            None => println!("no such user: {}", self.user),
            Some((user, balances)) => {
                println!("{}: bank_balance = {}", user.user_name, user.bank_balance);
                for balance in balances {
                    println!(
                        "  {}: last = {}, current = {}",
                        balance.game, balance.last_balance, balance.current_bot_balance
                    );
                }
            }
        }

        Ok(())
    }
}
