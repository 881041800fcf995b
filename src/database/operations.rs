//! `impl Repository for Database` - SQLite-backed implementation of the
//! narrow persistence interface (spec §4.4), in the style of the teacher's
//! per-stage `impl StageNOperations for Database` modules.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Transaction};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::database::traits::Repository;
use crate::database::Database;
use crate::domain::{BotBalance, User};
use crate::errors::{EngineError, EngineResult};

fn parse_stored_decimal(raw: &str) -> EngineResult<Decimal> {
    Decimal::from_str(raw)
        .map_err(|e| EngineError::Config(format!("corrupt decimal {:?} in store: {}", raw, e)))
}

impl Repository for Database {
    fn get_or_create_user(&self, tx: &Transaction, user_name: &str) -> EngineResult<User> {
        if let Some(user) = tx
            .query_row(
                "SELECT user_id, user_name, bank_balance FROM user_balances WHERE user_name = ?1",
                params![user_name],
                |row| {
                    let bank_balance_raw: String = row.get(2)?;
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, bank_balance_raw))
                },
            )
            .optional()?
        {
            let (id, user_name, bank_balance_raw) = user;
            return Ok(User {
                id,
                user_name,
                bank_balance: parse_stored_decimal(&bank_balance_raw)?,
            });
        }

        tx.execute(
            "INSERT INTO user_balances (user_name, bank_balance) VALUES (?1, ?2)",
            params![user_name, Decimal::ZERO.to_string()],
        )?;
        let id = tx.last_insert_rowid();
        Ok(User {
            id,
            user_name: user_name.to_string(),
            bank_balance: Decimal::ZERO,
        })
    }

    fn get_bot_balance(
        &self,
        tx: &Transaction,
        user_id: i64,
        game: &str,
    ) -> EngineResult<Option<BotBalance>> {
        let row = tx
            .query_row(
                "SELECT last_balance, current_bot_balance FROM bot_balances
                 WHERE user_id = ?1 AND game = ?2",
                params![user_id, game],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        match row {
            Some((last_raw, current_raw)) => Ok(Some(BotBalance {
                user_id,
                game: game.to_string(),
                last_balance: parse_stored_decimal(&last_raw)?,
                current_bot_balance: parse_stored_decimal(&current_raw)?,
            })),
            None => Ok(None),
        }
    }

    fn create_bot_balance(
        &self,
        tx: &Transaction,
        user_id: i64,
        game: &str,
        last_balance: Decimal,
        current_bot_balance: Decimal,
    ) -> EngineResult<()> {
        tx.execute(
            "INSERT INTO bot_balances (user_id, game, last_balance, current_bot_balance)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                user_id,
                game,
                last_balance.to_string(),
                current_bot_balance.to_string()
            ],
        )?;
        Ok(())
    }

    fn update_user_balance(
        &self,
        tx: &Transaction,
        user_id: i64,
        new_bank_balance: Decimal,
    ) -> EngineResult<()> {
        tx.execute(
            "UPDATE user_balances SET bank_balance = ?1 WHERE user_id = ?2",
            params![new_bank_balance.to_string(), user_id],
        )?;
        Ok(())
    }

    fn update_bot_last_balance(
        &self,
        tx: &Transaction,
        user_id: i64,
        game: &str,
        value: Decimal,
    ) -> EngineResult<()> {
        tx.execute(
            "UPDATE bot_balances SET last_balance = ?1 WHERE user_id = ?2 AND game = ?3",
            params![value.to_string(), user_id, game],
        )?;
        Ok(())
    }

    fn update_bot_current_balance(
        &self,
        tx: &Transaction,
        user_id: i64,
        game: &str,
        value: Decimal,
    ) -> EngineResult<()> {
        tx.execute(
            "UPDATE bot_balances SET current_bot_balance = ?1 WHERE user_id = ?2 AND game = ?3",
            params![value.to_string(), user_id, game],
        )?;
        Ok(())
    }

    fn is_processed(&self, tx: &Transaction, message_id: &str) -> EngineResult<bool> {
        let exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM processed_messages WHERE message_id = ?1",
                params![message_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(exists.is_some())
    }

    fn mark_processed(
        &self,
        tx: &Transaction,
        message_id: &str,
        processed_at: DateTime<Utc>,
    ) -> EngineResult<()> {
        tx.execute(
            "INSERT INTO processed_messages (message_id, processed_at) VALUES (?1, ?2)",
            params![message_id, processed_at.to_rfc3339()],
        )?;
        Ok(())
    }

    fn get_user_with_balances(
        &self,
        tx: &Transaction,
        user_name: &str,
    ) -> EngineResult<Option<(User, Vec<BotBalance>)>> {
        let user = self.get_or_create_user_readonly(tx, user_name)?;
        let Some(user) = user else {
            return Ok(None);
        };

        let mut stmt = tx.prepare(
            "SELECT game, last_balance, current_bot_balance FROM bot_balances WHERE user_id = ?1
             ORDER BY game",
        )?;
        let balances = stmt
            .query_map(params![user.id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut result = Vec::with_capacity(balances.len());
        for (game, last_raw, current_raw) in balances {
            result.push(BotBalance {
                user_id: user.id,
                game,
                last_balance: parse_stored_decimal(&last_raw)?,
                current_bot_balance: parse_stored_decimal(&current_raw)?,
            });
        }

        Ok(Some((user, result)))
    }
}

impl Database {
    /// Read-only lookup used by [`Repository::get_user_with_balances`] -
    /// unlike [`Repository::get_or_create_user`], a missing user is not an
    /// error or a creation trigger, just "nothing to report".
    fn get_or_create_user_readonly(
        &self,
        tx: &Transaction,
        user_name: &str,
    ) -> EngineResult<Option<User>> {
        tx.query_row(
            "SELECT user_id, user_name, bank_balance FROM user_balances WHERE user_name = ?1",
            params![user_name],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?
        .map(|(id, user_name, bank_balance_raw)| {
            Ok(User {
                id,
                user_name,
                bank_balance: parse_stored_decimal(&bank_balance_raw)?,
            })
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn creates_user_lazily_and_reuses_row() {
        let db = Database::new(":memory:").unwrap();
        let (id1, id2) = db
            .execute_transaction(|tx| {
                let a = db.get_or_create_user(tx, "Alice")?;
                let b = db.get_or_create_user(tx, "Alice")?;
                Ok((a.id, b.id))
            })
            .unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn bot_balance_round_trips_decimal() {
        let db = Database::new(":memory:").unwrap();
        db.execute_transaction(|tx| {
            let user = db.get_or_create_user(tx, "Bob")?;
            db.create_bot_balance(tx, user.id, "GD Cards", dec!(150), dec!(0))?;
            let balance = db.get_bot_balance(tx, user.id, "GD Cards")?.unwrap();
            assert_eq!(balance.last_balance, dec!(150));
            assert_eq!(balance.current_bot_balance, dec!(0));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn mark_processed_is_unique() {
        let db = Database::new(":memory:").unwrap();
        db.execute_transaction(|tx| db.mark_processed(tx, "id-1", Utc::now()))
            .unwrap();
        let err = db.execute_transaction(|tx| db.mark_processed(tx, "id-1", Utc::now()));
        assert!(err.is_err());
    }

    #[test]
    fn is_processed_reflects_mark_processed() {
        let db = Database::new(":memory:").unwrap();
        db.execute_transaction(|tx| {
            assert!(!db.is_processed(tx, "id-2")?);
            db.mark_processed(tx, "id-2", Utc::now())?;
            assert!(db.is_processed(tx, "id-2")?);
            Ok(())
        })
        .unwrap();
    }
}
