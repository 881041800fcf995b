//! Core ledger types shared across the engine (spec §3).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Well-known game identifiers. Games are configuration data (coefficients
/// are loaded from `config.toml`, see [`crate::coefficient`]), so these are
/// plain string constants rather than a closed enum - an operator can add a
/// new game to the config without a recompile as long as a classifier/parser
/// pair exists for its message formats.
pub mod games {
    pub const GD_CARDS: &str = "GD Cards";
    pub const SHMALALA: &str = "Shmalala";
    pub const SHMALALA_KARMA: &str = "Shmalala Karma";
    pub const TRUE_MAFIA: &str = "True Mafia";
    pub const BUNKER_RP: &str = "Bunker RP";
}

/// A user, identified by a case-preserving display name (spec §3, §9 open
/// question: case-sensitive by design, never folded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub user_name: String,
    pub bank_balance: Decimal,
}

/// Composite `(user, game)` ledger row (spec §3, invariant I1: at most one
/// row per pair).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotBalance {
    pub user_id: i64,
    pub game: String,
    pub last_balance: Decimal,
    pub current_bot_balance: Decimal,
}

/// The tagged variant produced by classifying + parsing a raw message
/// (spec §9 design notes: prefer a tagged variant over dynamic dispatch of
/// parser objects). [`crate::balance::BalanceManager`] matches on this once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedMessage {
    GdCardsProfile {
        player_name: String,
        orbs: Decimal,
    },
    GdCardsAccrual {
        player_name: String,
        points: Decimal,
    },
    Fishing {
        player_name: String,
        coins: Decimal,
    },
    Karma {
        player_name: String,
    },
    MafiaProfile {
        player_name: String,
        money: Decimal,
    },
    BunkerProfile {
        player_name: String,
        money: Decimal,
    },
    MafiaGameEnd {
        winners: Vec<String>,
    },
    BunkerGameEnd {
        winners: Vec<String>,
    },
    /// Classifier found no matching label. Not an error (spec §7): the
    /// engine commits an empty transaction and marks the message processed.
    Unknown,
}

impl ClassifiedMessage {
    /// The game this message's balance effects apply to, if any.
    pub fn game(&self) -> Option<&'static str> {
        match self {
            ClassifiedMessage::GdCardsProfile { .. } | ClassifiedMessage::GdCardsAccrual { .. } => {
                Some(games::GD_CARDS)
            }
            ClassifiedMessage::Fishing { .. } => Some(games::SHMALALA),
            ClassifiedMessage::Karma { .. } => Some(games::SHMALALA_KARMA),
            ClassifiedMessage::MafiaProfile { .. } | ClassifiedMessage::MafiaGameEnd { .. } => {
                Some(games::TRUE_MAFIA)
            }
            ClassifiedMessage::BunkerProfile { .. } | ClassifiedMessage::BunkerGameEnd { .. } => {
                Some(games::BUNKER_RP)
            }
            ClassifiedMessage::Unknown => None,
        }
    }
}
