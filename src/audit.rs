//! AuditLogger (C6, spec §4.6) - one structured record per balance-affecting
//! operation. Records are advisory (not part of the ledger) but MUST be
//! emitted before the enclosing transaction commits.
//!
//! Built on `tracing`, following the teacher codebase's practice of logging
//! structured fields on the event rather than a pre-formatted string.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{error, info};

/// The kind of balance-affecting operation a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditKind {
    ProfileInit,
    ProfileUpdate,
    Accrual,
    GameEndReward,
    Error,
}

impl AuditKind {
    fn as_str(&self) -> &'static str {
        match self {
            AuditKind::ProfileInit => "profile_init",
            AuditKind::ProfileUpdate => "profile_update",
            AuditKind::Accrual => "accrual",
            AuditKind::GameEndReward => "game_end_reward",
            AuditKind::Error => "error",
        }
    }
}

/// One emitted audit record (spec §4.6 field list).
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub kind: AuditKind,
    pub player: String,
    pub game: Option<String>,
    pub before: Option<Decimal>,
    pub after: Option<Decimal>,
    pub delta: Option<Decimal>,
    pub coefficient: Option<Decimal>,
    pub bank_change: Option<Decimal>,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

/// Emits audit records via `tracing`. Stateless; cheap to construct per call
/// or to hold for the lifetime of a [`crate::processor::MessageProcessor`].
#[derive(Debug, Default, Clone, Copy)]
pub struct AuditLogger;

impl AuditLogger {
    pub fn new() -> Self {
        Self
    }

    /// Emit a balance-affecting record. Call this before committing the
    /// enclosing transaction (spec §4.6, §7 atomicity).
    pub fn emit(&self, record: &AuditRecord) {
        match record.kind {
            AuditKind::Error => error!(
                timestamp = %record.timestamp.to_rfc3339(),
                kind = record.kind.as_str(),
                player = %record.player,
                game = record.game.as_deref().unwrap_or(""),
                message_id = record.message_id.as_deref().unwrap_or(""),
                error = record.error.as_deref().unwrap_or(""),
                "audit: balance operation failed"
            ),
            _ => info!(
                timestamp = %record.timestamp.to_rfc3339(),
                kind = record.kind.as_str(),
                player = %record.player,
                game = record.game.as_deref().unwrap_or(""),
                before = %record.before.map(|d| d.to_string()).unwrap_or_default(),
                after = %record.after.map(|d| d.to_string()).unwrap_or_default(),
                delta = %record.delta.map(|d| d.to_string()).unwrap_or_default(),
                coefficient = %record.coefficient.map(|d| d.to_string()).unwrap_or_default(),
                bank_change = %record.bank_change.map(|d| d.to_string()).unwrap_or_default(),
                message_id = record.message_id.as_deref().unwrap_or(""),
                "audit: balance operation applied"
            ),
        }
    }

    pub fn emit_error(&self, player: &str, game: Option<&str>, message_id: Option<&str>, error: impl std::fmt::Display) {
        self.emit(&AuditRecord {
            timestamp: Utc::now(),
            kind: AuditKind::Error,
            player: player.to_string(),
            game: game.map(|g| g.to_string()),
            before: None,
            after: None,
            delta: None,
            coefficient: None,
            bank_change: None,
            message_id: message_id.map(|m| m.to_string()),
            error: Some(error.to_string()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn emit_does_not_panic_for_any_kind() {
        let logger = AuditLogger::new();
        for kind in [
            AuditKind::ProfileInit,
            AuditKind::ProfileUpdate,
            AuditKind::Accrual,
            AuditKind::GameEndReward,
            AuditKind::Error,
        ] {
            logger.emit(&AuditRecord {
                timestamp: Utc::now(),
                kind,
                player: "Alice".to_string(),
                game: Some("GD Cards".to_string()),
                before: Some(dec!(100)),
                after: Some(dec!(150)),
                delta: Some(dec!(50)),
                coefficient: Some(dec!(2)),
                bank_change: Some(dec!(100)),
                message_id: Some("abc123".to_string()),
                error: None,
            });
        }
    }

    #[test]
    fn emit_error_helper_builds_error_record() {
        let logger = AuditLogger::new();
        logger.emit_error("Bob", Some("Shmalala"), Some("id-1"), "boom");
    }
}
