//! MessageProcessor (C8, spec §4.8) - the orchestrator. `process(raw_text,
//! timestamp)` is the engine's single ingestion entry point (spec §6).

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::audit::AuditLogger;
use crate::balance::BalanceManager;
use crate::classifier::{self, MessageLabel};
use crate::coefficient::CoefficientProvider;
use crate::database::{Database, Repository};
use crate::domain::ClassifiedMessage;
use crate::errors::{ParseError, ProcessError};
use crate::idempotency::derive_message_id;
use crate::{config::EngineConfig, parsers};

/// Orchestrates idempotency -> transaction -> classify -> parse -> balance ->
/// commit for one raw message (spec §4.8). Holds the long-lived collaborators
/// a `process` call needs; construct once and reuse across messages.
pub struct MessageProcessor {
    database: Database,
    coefficients: CoefficientProvider,
    audit: AuditLogger,
    true_mafia_reward: rust_decimal::Decimal,
    bunker_rp_reward: rust_decimal::Decimal,
}

impl MessageProcessor {
    pub fn new(database: Database, config: &EngineConfig) -> Self {
        Self {
            database,
            coefficients: CoefficientProvider::new(config.coefficients.clone()),
            audit: AuditLogger::new(),
            true_mafia_reward: config.rewards.true_mafia_winner,
            bunker_rp_reward: config.rewards.bunker_rp_winner,
        }
    }

    /// Inspect a user's bank balance and per-game bot balances. Read-only;
    /// used by the `balance` CLI command and by tests asserting on ledger
    /// state after a `process` call.
    pub fn inspect_user(
        &self,
        user_name: &str,
    ) -> crate::errors::EngineResult<Option<(crate::domain::User, Vec<crate::domain::BotBalance>)>>
    {
        self.database
            .execute_transaction(|tx| self.database.get_user_with_balances(tx, user_name))
    }

    /// The engine's single public ingestion operation (spec §6). On success,
    /// the message's ledger effects (if any) are durably committed and the
    /// message is marked processed.
    pub fn process(&self, raw_text: &str, timestamp: DateTime<Utc>) -> Result<(), ProcessError> {
        let message_id = derive_message_id(raw_text, timestamp);

        let already_processed = self
            .database
            .execute_transaction(|tx| self.database.is_processed(tx, &message_id))
            .map_err(ProcessError::from)?;

        if already_processed {
            debug!(message_id = %message_id, "duplicate message, idempotent no-op");
            return Ok(());
        }

        let label = classifier::classify(raw_text);
        let parsed = match parsers::parse(label, raw_text) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.audit
                    .emit_error("<unparsed>", None, Some(&message_id), &e);
                return Err(ProcessError::from(e));
            }
        };

        let result = self.database.execute_transaction(|tx| {
            self.apply(tx, &parsed, &message_id, label)?;
            self.database
                .mark_processed(tx, &message_id, timestamp)
                .map_err(crate::errors::EngineError::from)?;
            Ok(())
        });

        if let Err(ref e) = result {
            self.audit.emit_error(
                parsed_player_hint(&parsed).unwrap_or("<unknown>"),
                parsed.game(),
                Some(&message_id),
                e,
            );
        }

        result.map_err(ProcessError::from)
    }

    /// Dispatch a classified-and-parsed message to the BalanceManager. The
    /// `UNKNOWN` case is not an error (spec §7): nothing is applied, and the
    /// caller still marks the message processed so it doesn't re-enter the
    /// pipeline on retry.
    fn apply(
        &self,
        tx: &rusqlite::Transaction,
        parsed: &ClassifiedMessage,
        message_id: &str,
        label: MessageLabel,
    ) -> Result<(), crate::errors::EngineError> {
        let manager = BalanceManager::new(&self.database, &self.coefficients, &self.audit);

        match parsed {
            ClassifiedMessage::GdCardsProfile { player_name, orbs } => manager
                .process_profile(
                    tx,
                    player_name,
                    crate::domain::games::GD_CARDS,
                    *orbs,
                    message_id,
                )?,
            ClassifiedMessage::GdCardsAccrual {
                player_name,
                points,
            } => manager.process_accrual(
                tx,
                player_name,
                crate::domain::games::GD_CARDS,
                *points,
                message_id,
            )?,
            ClassifiedMessage::Fishing { player_name, coins } => manager.process_accrual(
                tx,
                player_name,
                crate::domain::games::SHMALALA,
                *coins,
                message_id,
            )?,
            ClassifiedMessage::Karma { player_name } => {
                manager.process_karma(tx, player_name, message_id)?
            }
            ClassifiedMessage::MafiaProfile { player_name, money } => manager.process_profile(
                tx,
                player_name,
                crate::domain::games::TRUE_MAFIA,
                *money,
                message_id,
            )?,
            ClassifiedMessage::BunkerProfile { player_name, money } => manager.process_profile(
                tx,
                player_name,
                crate::domain::games::BUNKER_RP,
                *money,
                message_id,
            )?,
            ClassifiedMessage::MafiaGameEnd { winners } => manager.process_game_winners(
                tx,
                winners,
                crate::domain::games::TRUE_MAFIA,
                self.true_mafia_reward,
                message_id,
            )?,
            ClassifiedMessage::BunkerGameEnd { winners } => manager.process_game_winners(
                tx,
                winners,
                crate::domain::games::BUNKER_RP,
                self.bunker_rp_reward,
                message_id,
            )?,
            ClassifiedMessage::Unknown => {
                let _ = label;
            }
        }

        Ok(())
    }
}

fn parsed_player_hint(parsed: &ClassifiedMessage) -> Option<&str> {
    match parsed {
        ClassifiedMessage::GdCardsProfile { player_name, .. }
        | ClassifiedMessage::GdCardsAccrual { player_name, .. }
        | ClassifiedMessage::Fishing { player_name, .. }
        | ClassifiedMessage::Karma { player_name }
        | ClassifiedMessage::MafiaProfile { player_name, .. }
        | ClassifiedMessage::BunkerProfile { player_name, .. } => Some(player_name.as_str()),
        ClassifiedMessage::MafiaGameEnd { .. }
        | ClassifiedMessage::BunkerGameEnd { .. }
        | ClassifiedMessage::Unknown => None,
    }
}

impl From<ParseError> for ProcessError {
    fn from(err: ParseError) -> Self {
        ProcessError::ParseFailed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn processor() -> MessageProcessor {
        let database = Database::new(":memory:").unwrap();
        MessageProcessor::new(database, &EngineConfig::defaults())
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn scenario_s1_first_profile_sighting() {
        let processor = processor();
        processor
            .process("ПРОФИЛЬ Alice\nОрбы: 150", ts(0))
            .unwrap();

        processor
            .database
            .execute_transaction(|tx| {
                let (user, balances) = processor
                    .database
                    .get_user_with_balances(tx, "Alice")?
                    .unwrap();
                assert_eq!(user.bank_balance, dec!(0));
                assert_eq!(balances.len(), 1);
                assert_eq!(balances[0].last_balance, dec!(150));
                assert_eq!(balances[0].current_bot_balance, dec!(0));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn scenario_s2_second_profile_sighting_applies_delta() {
        let processor = processor();
        processor
            .process("ПРОФИЛЬ Alice\nОрбы: 150", ts(0))
            .unwrap();
        processor
            .process("ПРОФИЛЬ Alice\nОрбы: 200", ts(1))
            .unwrap();

        processor
            .database
            .execute_transaction(|tx| {
                let (user, _) = processor
                    .database
                    .get_user_with_balances(tx, "Alice")?
                    .unwrap();
                assert_eq!(user.bank_balance, dec!(100));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn scenario_s5_mafia_game_end_rewards_each_winner() {
        let processor = processor();
        processor
            .process(
                "Игра окончена!\nПобедители:\nAlice - Мафия\nBob - Дон\n",
                ts(0),
            )
            .unwrap();

        processor
            .database
            .execute_transaction(|tx| {
                for name in ["Alice", "Bob"] {
                    let (user, balances) = processor
                        .database
                        .get_user_with_balances(tx, name)?
                        .unwrap();
                    assert_eq!(user.bank_balance, dec!(150));
                    assert_eq!(balances[0].current_bot_balance, dec!(10));
                }
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn scenario_s7_duplicate_submission_is_a_silent_no_op() {
        let processor = processor();
        let text = "🃏 НОВАЯ КАРТА 🃏\nИгрок: Bob\nОчки: +50";
        let timestamp = ts(0);

        processor.process(text, timestamp).unwrap();
        processor.process(text, timestamp).unwrap();

        processor
            .database
            .execute_transaction(|tx| {
                let (user, balances) = processor
                    .database
                    .get_user_with_balances(tx, "Bob")?
                    .unwrap();
                assert_eq!(user.bank_balance, dec!(100));
                assert_eq!(balances[0].current_bot_balance, dec!(50));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn unknown_message_commits_empty_and_is_marked_processed() {
        let processor = processor();
        processor.process("just some chat message", ts(0)).unwrap();

        let id = derive_message_id("just some chat message", ts(0));
        let processed = processor
            .database
            .execute_transaction(|tx| processor.database.is_processed(tx, &id))
            .unwrap();
        assert!(processed);
    }

    #[test]
    fn parse_failure_is_not_marked_processed() {
        let processor = processor();
        let text = "ПРОФИЛЬ Alice\nОрбы: not-a-number";
        let err = processor.process(text, ts(0)).unwrap_err();
        assert!(matches!(err, ProcessError::ParseFailed(_)));
        assert!(!err.is_retryable());

        let id = derive_message_id(text, ts(0));
        let processed = processor
            .database
            .execute_transaction(|tx| processor.database.is_processed(tx, &id))
            .unwrap();
        assert!(!processed);
    }

    #[test]
    fn unknown_game_is_not_retryable_and_not_marked_processed() {
        let database = Database::new(":memory:").unwrap();
        let mut config = EngineConfig::defaults();
        config.coefficients.remove(crate::domain::games::GD_CARDS);
        let processor = MessageProcessor::new(database, &config);

        let text = "🃏 НОВАЯ КАРТА 🃏\nИгрок: Bob\nОчки: +50";
        let err = processor.process(text, ts(0)).unwrap_err();
        assert!(matches!(err, ProcessError::UnknownGame(ref g) if g == crate::domain::games::GD_CARDS));
        assert!(!err.is_retryable());

        let id = derive_message_id(text, ts(0));
        let processed = processor
            .database
            .execute_transaction(|tx| processor.database.is_processed(tx, &id))
            .unwrap();
        assert!(!processed);
    }
}
