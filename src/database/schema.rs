//! Persisted state layout (spec §6): three logical tables plus the indexes
//! the repository's own query patterns need, following the teacher's
//! practice of pairing every table with the indexes its helpers use.

use rusqlite::Connection;

use crate::errors::EngineResult;

/// Initialise the schema. Idempotent - safe to call against an existing
/// database file.
pub fn setup_schema(connection: &Connection) -> EngineResult<()> {
    connection.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS user_balances (
            user_id INTEGER PRIMARY KEY,
            user_name TEXT NOT NULL UNIQUE,
            bank_balance TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS bot_balances (
            user_id INTEGER NOT NULL REFERENCES user_balances(user_id),
            game TEXT NOT NULL,
            last_balance TEXT NOT NULL,
            current_bot_balance TEXT NOT NULL,
            PRIMARY KEY (user_id, game)
        );

        CREATE TABLE IF NOT EXISTS processed_messages (
            message_id TEXT PRIMARY KEY,
            processed_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_bot_balances_game ON bot_balances(game);
        CREATE INDEX IF NOT EXISTS idx_processed_messages_processed_at
            ON processed_messages(processed_at);
        "#,
    )?;
    Ok(())
}
