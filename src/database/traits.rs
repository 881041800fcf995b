//! Repository (C4, spec §4.4) - the narrow persistence interface the engine
//! uses. Methods take an explicit `&Transaction` so that every mutation a
//! single `process(...)` call makes is visible together or not at all
//! (spec §4.4, §7 atomicity).

use chrono::{DateTime, Utc};
use rusqlite::Transaction;
use rust_decimal::Decimal;

use crate::domain::{BotBalance, User};
use crate::errors::EngineResult;

pub trait Repository {
    /// Look up a user by name, creating it (with a zero bank balance) on
    /// first sighting (spec §3 Lifecycles).
    fn get_or_create_user(&self, tx: &Transaction, user_name: &str) -> EngineResult<User>;

    /// `None` if no BotBalance row exists yet for `(user_id, game)`
    /// (spec §3 invariant I1: at most one row per pair).
    fn get_bot_balance(
        &self,
        tx: &Transaction,
        user_id: i64,
        game: &str,
    ) -> EngineResult<Option<BotBalance>>;

    /// Create the BotBalance row for `(user_id, game)`. Callers must have
    /// already checked [`Repository::get_bot_balance`] returns `None`.
    fn create_bot_balance(
        &self,
        tx: &Transaction,
        user_id: i64,
        game: &str,
        last_balance: Decimal,
        current_bot_balance: Decimal,
    ) -> EngineResult<()>;

    fn update_user_balance(
        &self,
        tx: &Transaction,
        user_id: i64,
        new_bank_balance: Decimal,
    ) -> EngineResult<()>;

    fn update_bot_last_balance(
        &self,
        tx: &Transaction,
        user_id: i64,
        game: &str,
        value: Decimal,
    ) -> EngineResult<()>;

    fn update_bot_current_balance(
        &self,
        tx: &Transaction,
        user_id: i64,
        game: &str,
        value: Decimal,
    ) -> EngineResult<()>;

    fn is_processed(&self, tx: &Transaction, message_id: &str) -> EngineResult<bool>;

    /// Record `message_id` as processed. Relies on the `PRIMARY KEY`
    /// constraint on `processed_messages.message_id` as the final arbiter
    /// against concurrent duplicate attempts (spec §5): a second attempt's
    /// insert fails here, rolling back that attempt's transaction.
    fn mark_processed(
        &self,
        tx: &Transaction,
        message_id: &str,
        processed_at: DateTime<Utc>,
    ) -> EngineResult<()>;

    /// Fetch a user's bank balance and per-game bot balances, for
    /// inspection (used by the CLI `balance` command, not by the ingestion
    /// path itself).
    fn get_user_with_balances(
        &self,
        tx: &Transaction,
        user_name: &str,
    ) -> EngineResult<Option<(User, Vec<BotBalance>)>>;
}
