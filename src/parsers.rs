//! Parsers (C2, spec §4.2, §6) - one parser per non-UNKNOWN label. Pure,
//! stateless extraction of typed fields from already-classified text.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::classifier::MessageLabel;
use crate::domain::ClassifiedMessage;
use crate::errors::ParseError;

static GDCARDS_PROFILE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^ПРОФИЛЬ\s+(.+?)\s*$").unwrap());
static GDCARDS_PROFILE_ORBS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^Орбы:\s*(-?\d+(?:\.\d+)?)\s*$").unwrap());
static GDCARDS_ACCRUAL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^Игрок:\s*(.+?)\s*$").unwrap());
static GDCARDS_ACCRUAL_POINTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^Очки:\s*\+(\d+(?:\.\d+)?)\s*$").unwrap());
static FISHING_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^Рыбак:\s*(.+?)\s*$").unwrap());
static FISHING_COINS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^Монеты:\s*\+(\d+(?:\.\d+)?)\s*$").unwrap());
static KARMA_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"пользователя\s+([^\s.,!?]+)").unwrap());
static PLAYER_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^👤\s*(.+?)\s*$").unwrap());
static MONEY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^💵\s*Деньги:\s*(-?\d+(?:\.\d+)?)\s*$").unwrap());
static MAFIA_WINNER_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(.+?)\s*-\s*.+$").unwrap());
static BUNKER_WINNER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\d+\.\s*(.+?)\s*$").unwrap());

fn trimmed(s: &str) -> String {
    s.trim().to_string()
}

fn parse_decimal(label: &'static str, field: &str, raw: &str) -> Result<Decimal, ParseError> {
    Decimal::from_str(raw.trim())
        .map_err(|e| ParseError::new(label, format!("invalid {} value {:?}: {}", field, raw, e)))
}

fn capture_field<'a>(
    re: &Regex,
    text: &'a str,
    label: &'static str,
    field: &str,
) -> Result<&'a str, ParseError> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| ParseError::new(label, format!("missing {} field", field)))
}

fn parse_gdcards_profile(text: &str) -> Result<ClassifiedMessage, ParseError> {
    let label = MessageLabel::GdCardsProfile.as_str();
    let name = capture_field(&GDCARDS_PROFILE_NAME, text, label, "player_name")?;
    let orbs_raw = capture_field(&GDCARDS_PROFILE_ORBS, text, label, "orbs")?;
    Ok(ClassifiedMessage::GdCardsProfile {
        player_name: trimmed(name),
        orbs: parse_decimal(label, "orbs", orbs_raw)?,
    })
}

fn parse_gdcards_accrual(text: &str) -> Result<ClassifiedMessage, ParseError> {
    let label = MessageLabel::GdCardsAccrual.as_str();
    let name = capture_field(&GDCARDS_ACCRUAL_NAME, text, label, "player_name")?;
    let points_raw = capture_field(&GDCARDS_ACCRUAL_POINTS, text, label, "points")?;
    let points = parse_decimal(label, "points", points_raw)?;
    if points.is_sign_negative() {
        return Err(ParseError::new(label, "points must be non-negative"));
    }
    Ok(ClassifiedMessage::GdCardsAccrual {
        player_name: trimmed(name),
        points,
    })
}

fn parse_fishing(text: &str) -> Result<ClassifiedMessage, ParseError> {
    let label = MessageLabel::Fishing.as_str();
    let name = capture_field(&FISHING_NAME, text, label, "player_name")?;
    let coins_raw = capture_field(&FISHING_COINS, text, label, "coins")?;
    let coins = parse_decimal(label, "coins", coins_raw)?;
    if coins.is_sign_negative() {
        return Err(ParseError::new(label, "coins must be non-negative"));
    }
    Ok(ClassifiedMessage::Fishing {
        player_name: trimmed(name),
        coins,
    })
}

fn parse_karma(text: &str) -> Result<ClassifiedMessage, ParseError> {
    let label = MessageLabel::Karma.as_str();
    let name = capture_field(&KARMA_NAME, text, label, "player_name")?;
    Ok(ClassifiedMessage::Karma {
        player_name: trimmed(name),
    })
}

fn parse_mafia_profile(text: &str) -> Result<ClassifiedMessage, ParseError> {
    let label = MessageLabel::MafiaProfile.as_str();
    let name = capture_field(&PLAYER_LINE, text, label, "player_name")?;
    let money_raw = capture_field(&MONEY_LINE, text, label, "money")?;
    Ok(ClassifiedMessage::MafiaProfile {
        player_name: trimmed(name),
        money: parse_decimal(label, "money", money_raw)?,
    })
}

fn parse_bunker_profile(text: &str) -> Result<ClassifiedMessage, ParseError> {
    let label = MessageLabel::BunkerProfile.as_str();
    let name = capture_field(&PLAYER_LINE, text, label, "player_name")?;
    let money_raw = capture_field(&MONEY_LINE, text, label, "money")?;
    Ok(ClassifiedMessage::BunkerProfile {
        player_name: trimmed(name),
        money: parse_decimal(label, "money", money_raw)?,
    })
}

/// Extract the winner-list block following `header` until a blank line.
fn winner_block<'a>(text: &'a str, header: &str) -> Option<&'a str> {
    let start = text.find(header)? + header.len();
    let rest = &text[start..];
    let end = rest.find("\n\n").unwrap_or(rest.len());
    Some(&rest[..end])
}

fn parse_mafia_game_end(text: &str) -> Result<ClassifiedMessage, ParseError> {
    let label = MessageLabel::MafiaGameEnd.as_str();
    let block = winner_block(text, "Победители:").ok_or_else(|| {
        ParseError::new(label, "missing Победители: section")
    })?;
    let winners = MAFIA_WINNER_LINE
        .captures_iter(block)
        .filter_map(|c| c.get(1).map(|m| trimmed(m.as_str())))
        .filter(|name| !name.is_empty())
        .collect();
    Ok(ClassifiedMessage::MafiaGameEnd { winners })
}

fn parse_bunker_game_end(text: &str) -> Result<ClassifiedMessage, ParseError> {
    let label = MessageLabel::BunkerGameEnd.as_str();
    let block = winner_block(text, "Прошли в бункер:").ok_or_else(|| {
        ParseError::new(label, "missing Прошли в бункер: section")
    })?;
    let winners = BUNKER_WINNER_LINE
        .captures_iter(block)
        .filter_map(|c| c.get(1).map(|m| trimmed(m.as_str())))
        .filter(|name| !name.is_empty())
        .collect();
    Ok(ClassifiedMessage::BunkerGameEnd { winners })
}

/// Dispatch to the matching parser for an already-classified label (spec §4.2).
pub fn parse(label: MessageLabel, text: &str) -> Result<ClassifiedMessage, ParseError> {
    match label {
        MessageLabel::GdCardsProfile => parse_gdcards_profile(text),
        MessageLabel::GdCardsAccrual => parse_gdcards_accrual(text),
        MessageLabel::Fishing => parse_fishing(text),
        MessageLabel::Karma => parse_karma(text),
        MessageLabel::MafiaProfile => parse_mafia_profile(text),
        MessageLabel::BunkerProfile => parse_bunker_profile(text),
        MessageLabel::MafiaGameEnd => parse_mafia_game_end(text),
        MessageLabel::BunkerGameEnd => parse_bunker_game_end(text),
        MessageLabel::Unknown => Ok(ClassifiedMessage::Unknown),
    }
}
