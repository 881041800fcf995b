//! Engine configuration loaded from `config.toml` or environment variables
//! (spec §4.3, §6), following the teacher's layered-defaults pattern in
//! `AppConfig::load()`.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use config::{Config, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::games;
use crate::errors::EngineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsConfig {
    /// Fixed reward per True Mafia winner (spec §6: 10 units each).
    pub true_mafia_winner: Decimal,
    /// Fixed reward per Bunker RP winner (spec §6: 30 units each).
    pub bunker_rp_winner: Decimal,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            true_mafia_winner: Decimal::from(10),
            bunker_rp_winner: Decimal::from(30),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdempotencyConfig {
    /// How long `is_processed` lookups are guaranteed fast for (spec §3
    /// Lifecycles). Compaction beyond this window is out of scope.
    pub recent_window_days: u32,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            recent_window_days: 30,
        }
    }
}

/// Top-level engine configuration. Constructed once and passed explicitly -
/// no hidden global state (spec §9 design notes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub database: DatabaseConfig,
    pub coefficients: HashMap<String, Decimal>,
    pub rewards: RewardsConfig,
    pub idempotency: IdempotencyConfig,
}

/// The games this build of the engine knows how to classify and parse
/// messages for. Used to validate the coefficient table at startup.
pub const KNOWN_GAMES: &[&str] = &[
    games::GD_CARDS,
    games::SHMALALA,
    games::SHMALALA_KARMA,
    games::TRUE_MAFIA,
    games::BUNKER_RP,
];

fn default_coefficients() -> HashMap<String, Decimal> {
    let mut map = HashMap::new();
    map.insert(games::GD_CARDS.to_string(), Decimal::from(2));
    map.insert(games::SHMALALA.to_string(), Decimal::from(1));
    map.insert(games::SHMALALA_KARMA.to_string(), Decimal::from(10));
    map.insert(games::TRUE_MAFIA.to_string(), Decimal::from(15));
    map.insert(games::BUNKER_RP.to_string(), Decimal::from(20));
    map
}

impl EngineConfig {
    /// Load configuration from `config.toml` (if present) and environment
    /// variables prefixed `BANKBOT_`. Environment variables take precedence
    /// over the file, which takes precedence over built-in defaults.
    pub fn load() -> Result<Self, EngineError> {
        let rewards = RewardsConfig::default();
        let idempotency = IdempotencyConfig::default();

        let builder = Config::builder()
            .set_default("database.path", "./bankbot.db")?
            .set_default(
                "rewards.true_mafia_winner",
                rewards.true_mafia_winner.to_string(),
            )?
            .set_default(
                "rewards.bunker_rp_winner",
                rewards.bunker_rp_winner.to_string(),
            )?
            .set_default(
                "idempotency.recent_window_days",
                idempotency.recent_window_days as i64,
            )?
            .add_source(File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("BANKBOT").separator("__"));

        let built = builder.build()?;

        let partial: PartialConfig = built
            .try_deserialize()
            .map_err(|e| EngineError::Config(e.to_string()))?;
        let mut engine_config = partial.into_engine_config()?;

        if let Ok(db_path) = env::var("BANKBOT_DATABASE_PATH") {
            engine_config.database.path = PathBuf::from(db_path);
        }

        engine_config.validate()?;
        Ok(engine_config)
    }

    /// Build a config with sensible defaults, bypassing any file or
    /// environment lookup. Useful for tests and the CLI's `init-db` command.
    pub fn defaults() -> Self {
        Self {
            database: DatabaseConfig {
                path: PathBuf::from("./bankbot.db"),
            },
            coefficients: default_coefficients(),
            rewards: RewardsConfig::default(),
            idempotency: IdempotencyConfig::default(),
        }
    }

    /// Missing coefficient keys for any game the engine is configured to
    /// handle is a startup error (spec §4.3, §6).
    fn validate(&self) -> Result<(), EngineError> {
        crate::coefficient::CoefficientProvider::new(self.coefficients.clone())
            .ensure_configured(KNOWN_GAMES)
    }
}

/// Deserialisation target that falls back to defaults for `coefficients`
/// when the config source doesn't define the table at all (as opposed to
/// defining it with missing keys, which `validate` rejects).
#[derive(Debug, Deserialize)]
struct PartialConfig {
    database: DatabaseConfig,
    #[serde(default)]
    coefficients: Option<HashMap<String, Decimal>>,
    rewards: RewardsConfig,
    idempotency: IdempotencyConfig,
}

impl PartialConfig {
    fn into_engine_config(self) -> Result<EngineConfig, EngineError> {
        Ok(EngineConfig {
            database: self.database,
            coefficients: self.coefficients.unwrap_or_else(default_coefficients),
            rewards: self.rewards,
            idempotency: self.idempotency,
        })
    }
}
