//! BalanceManager (C7, spec §4.7) - all balance arithmetic and cross-ledger
//! invariants live here. Every entry point takes the open transaction its
//! caller ([`crate::processor::MessageProcessor`]) is already holding, so a
//! BalanceManager operation never commits or rolls back on its own.

use chrono::Utc;
use rusqlite::Transaction;
use rust_decimal::Decimal;

use crate::audit::{AuditKind, AuditLogger, AuditRecord};
use crate::coefficient::CoefficientProvider;
use crate::database::Repository;
use crate::errors::EngineResult;

/// All balance arithmetic and cross-ledger invariants (spec §4.7). Pure
/// orchestration over a [`Repository`] and a [`CoefficientProvider`] - holds
/// no state of its own.
pub struct BalanceManager<'a> {
    repository: &'a dyn Repository,
    coefficients: &'a CoefficientProvider,
    audit: &'a AuditLogger,
}

impl<'a> BalanceManager<'a> {
    pub fn new(
        repository: &'a dyn Repository,
        coefficients: &'a CoefficientProvider,
        audit: &'a AuditLogger,
    ) -> Self {
        Self {
            repository,
            coefficients,
            audit,
        }
    }

    /// Delta-based snapshot update (spec §4.7). First sighting anchors the
    /// player on `game` without touching `bank_balance` - this is the only
    /// way the engine avoids minting phantom currency from an initial
    /// snapshot value.
    pub fn process_profile(
        &self,
        tx: &Transaction,
        player_name: &str,
        game: &'static str,
        observed_amount: Decimal,
        message_id: &str,
    ) -> EngineResult<()> {
        let user = self.repository.get_or_create_user(tx, player_name)?;
        let existing = self.repository.get_bot_balance(tx, user.id, game)?;

        match existing {
            None => {
                self.repository
                    .create_bot_balance(tx, user.id, game, observed_amount, Decimal::ZERO)?;
                self.audit.emit(&AuditRecord {
                    timestamp: Utc::now(),
                    kind: AuditKind::ProfileInit,
                    player: player_name.to_string(),
                    game: Some(game.to_string()),
                    before: None,
                    after: Some(observed_amount),
                    delta: None,
                    coefficient: None,
                    bank_change: None,
                    message_id: Some(message_id.to_string()),
                    error: None,
                });
            }
            Some(existing) => {
                let delta = observed_amount - existing.last_balance;
                let coefficient = self.coefficients.get(game)?;
                let bank_change = delta * coefficient;

                self.repository
                    .update_bot_last_balance(tx, user.id, game, observed_amount)?;
                let new_bank_balance = user.bank_balance + bank_change;
                self.repository
                    .update_user_balance(tx, user.id, new_bank_balance)?;

                self.audit.emit(&AuditRecord {
                    timestamp: Utc::now(),
                    kind: AuditKind::ProfileUpdate,
                    player: player_name.to_string(),
                    game: Some(game.to_string()),
                    before: Some(existing.last_balance),
                    after: Some(observed_amount),
                    delta: Some(delta),
                    coefficient: Some(coefficient),
                    bank_change: Some(bank_change),
                    message_id: Some(message_id.to_string()),
                    error: None,
                });
            }
        }

        Ok(())
    }

    /// Additive event credit (spec §4.7). `current_bot_balance` accrues the
    /// in-game amount; `bank_balance` accrues `amount * coefficient(game)`.
    /// `last_balance` is never touched here - the split from
    /// [`BalanceManager::process_profile`] is load-bearing (spec §4.7).
    pub fn process_accrual(
        &self,
        tx: &Transaction,
        player_name: &str,
        game: &'static str,
        amount: Decimal,
        message_id: &str,
    ) -> EngineResult<()> {
        self.credit(tx, player_name, game, amount, message_id, AuditKind::Accrual)
    }

    /// `process_accrual(player, "Shmalala Karma", 1)` (spec §4.7, exact
    /// wording).
    pub fn process_karma(
        &self,
        tx: &Transaction,
        player_name: &str,
        message_id: &str,
    ) -> EngineResult<()> {
        self.process_accrual(
            tx,
            player_name,
            crate::domain::games::SHMALALA_KARMA,
            Decimal::ONE,
            message_id,
        )
    }

    /// For each winner in order, accrual semantics with `amount =
    /// fixed_amount` (spec §4.7), audited under [`AuditKind::GameEndReward`]
    /// rather than [`AuditKind::Accrual`] so a game-end credit is
    /// distinguishable from a routine accrual in the log (spec §4.6).
    /// Ordering affects only audit records, not final state.
    pub fn process_game_winners(
        &self,
        tx: &Transaction,
        winners: &[String],
        game: &'static str,
        fixed_amount: Decimal,
        message_id: &str,
    ) -> EngineResult<()> {
        for winner in winners {
            self.credit(
                tx,
                winner,
                game,
                fixed_amount,
                message_id,
                AuditKind::GameEndReward,
            )?;
        }
        Ok(())
    }

    /// Shared additive-credit ledger mutation behind [`BalanceManager::process_accrual`]
    /// and [`BalanceManager::process_game_winners`]; only the audit record's
    /// `kind` differs between the two callers.
    fn credit(
        &self,
        tx: &Transaction,
        player_name: &str,
        game: &'static str,
        amount: Decimal,
        message_id: &str,
        kind: AuditKind,
    ) -> EngineResult<()> {
        let user = self.repository.get_or_create_user(tx, player_name)?;
        let existing = self.repository.get_bot_balance(tx, user.id, game)?;

        let current_before = match &existing {
            Some(existing) => existing.current_bot_balance,
            None => {
                self.repository
                    .create_bot_balance(tx, user.id, game, Decimal::ZERO, Decimal::ZERO)?;
                Decimal::ZERO
            }
        };

        let new_current = current_before + amount;
        self.repository
            .update_bot_current_balance(tx, user.id, game, new_current)?;

        let coefficient = self.coefficients.get(game)?;
        let bank_change = amount * coefficient;
        let new_bank_balance = user.bank_balance + bank_change;
        self.repository
            .update_user_balance(tx, user.id, new_bank_balance)?;

        self.audit.emit(&AuditRecord {
            timestamp: Utc::now(),
            kind,
            player: player_name.to_string(),
            game: Some(game.to_string()),
            before: Some(current_before),
            after: Some(new_current),
            delta: Some(amount),
            coefficient: Some(coefficient),
            bank_change: Some(bank_change),
            message_id: Some(message_id.to_string()),
            error: None,
        });

        Ok(())
    }
}
