//! Persistence layer for the balance engine.
//!
//! `Database` wraps a single SQLite connection behind a mutex and is the
//! sole implementor of [`traits::Repository`]. The mutex is the engine's
//! concurrency boundary: a single global lock around `process(...)` is
//! acceptable for low-throughput deployments (spec §9 design notes), and
//! taking `&self` rather than `&mut self` lets callers share one `Database`
//! across collaborators (e.g. [`crate::balance::BalanceManager`]) without
//! juggling exclusive borrows.

mod operations;
pub mod schema;
pub mod traits;

pub use schema::setup_schema;
pub use traits::Repository;

use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use crate::errors::EngineResult;

pub struct Database {
    connection: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database file at `database_path` and ensure the
    /// schema is in place. Pass `":memory:"` for an ephemeral database, as
    /// tests do.
    pub fn new(database_path: &str) -> EngineResult<Self> {
        let connection = Connection::open(database_path)?;
        setup_schema(&connection)?;
        info!(path = database_path, "database initialised");
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Run `f` inside a single SQLite transaction, committing on success and
    /// rolling back on any error `f` returns (spec §4.4, §7 atomicity: either
    /// every mutation a `process(...)` call makes is visible, or none is).
    pub fn execute_transaction<F, R>(&self, f: F) -> EngineResult<R>
    where
        F: FnOnce(&rusqlite::Transaction) -> EngineResult<R>,
    {
        let mut guard = self
            .connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let tx = guard.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_initialises_schema_on_memory_db() {
        let db = Database::new(":memory:").unwrap();
        let count: i64 = db
            .connection
            .lock()
            .unwrap()
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(count >= 3);
    }

    #[test]
    fn execute_transaction_rolls_back_on_error() {
        use crate::errors::EngineError;

        let db = Database::new(":memory:").unwrap();
        let result: EngineResult<()> = db.execute_transaction(|tx| {
            tx.execute(
                "INSERT INTO user_balances (user_name, bank_balance) VALUES ('Eve', '0')",
                [],
            )?;
            Err(EngineError::Config("force rollback".to_string()))
        });
        assert!(result.is_err());

        let count: i64 = db
            .connection
            .lock()
            .unwrap()
            .query_row("SELECT count(*) FROM user_balances", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
