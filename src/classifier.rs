//! Classifier (C1, spec §4.1, §6) - maps raw text to one of the known
//! message labels by presence of distinguishing substrings.
//!
//! Matching order matters where substrings overlap: game-end markers first,
//! then profile markers (which contain the currency symbol), then activity
//! markers, then karma.

/// One of the fixed set of labels the classifier can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageLabel {
    GdCardsProfile,
    GdCardsAccrual,
    Fishing,
    Karma,
    MafiaGameEnd,
    MafiaProfile,
    BunkerGameEnd,
    BunkerProfile,
    Unknown,
}

impl MessageLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageLabel::GdCardsProfile => "GDCARDS_PROFILE",
            MessageLabel::GdCardsAccrual => "GDCARDS_ACCRUAL",
            MessageLabel::Fishing => "FISHING",
            MessageLabel::Karma => "KARMA",
            MessageLabel::MafiaGameEnd => "MAFIA_GAME_END",
            MessageLabel::MafiaProfile => "MAFIA_PROFILE",
            MessageLabel::BunkerGameEnd => "BUNKER_GAME_END",
            MessageLabel::BunkerProfile => "BUNKER_PROFILE",
            MessageLabel::Unknown => "UNKNOWN",
        }
    }
}

/// Pure function of input; identical inputs always yield identical labels
/// (spec §4.1 Determinism).
pub fn classify(text: &str) -> MessageLabel {
    // Game-end markers first - they can otherwise be mistaken for profile
    // text from the same bot.
    if text.contains("Игра окончена!") && text.contains("Победители:") {
        return MessageLabel::MafiaGameEnd;
    }
    if text.contains("Прошли в бункер:") {
        return MessageLabel::BunkerGameEnd;
    }

    // Profile markers (contain the currency symbol) next.
    if text.contains("ПРОФИЛЬ") && text.contains("Орбы:") {
        return MessageLabel::GdCardsProfile;
    }
    if text.contains("💎 Камни:") && text.contains("🎎 Активная роль:") && text.contains("💵 Деньги:")
    {
        return MessageLabel::MafiaProfile;
    }
    if text.contains("💎 Кристаллики:") && text.contains("🎯 Побед:") && text.contains("💵 Деньги:") {
        return MessageLabel::BunkerProfile;
    }

    // Activity markers.
    if text.contains("(🃏 НОВАЯ КАРТА 🃏") {
        return MessageLabel::GdCardsAccrual;
    }
    if text.contains("🎣 [Рыбалка] 🎣") {
        return MessageLabel::Fishing;
    }

    // Karma last.
    if text.contains("Лайк! Вы повысили рейтинг пользователя") {
        return MessageLabel::Karma;
    }

    MessageLabel::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_gdcards_profile() {
        let text = "ПРОФИЛЬ Alice\nОрбы: 150";
        assert_eq!(classify(text), MessageLabel::GdCardsProfile);
    }

    #[test]
    fn classifies_gdcards_accrual() {
        let text = "🃏 НОВАЯ КАРТА 🃏\nИгрок: Bob\nОчки: +50";
        assert_eq!(classify(text), MessageLabel::GdCardsAccrual);
    }

    #[test]
    fn classifies_fishing() {
        let text = "🎣 [Рыбалка] 🎣\nРыбак: Bob\nМонеты: +10";
        assert_eq!(classify(text), MessageLabel::Fishing);
    }

    #[test]
    fn classifies_karma() {
        let text = "Лайк! Вы повысили рейтинг пользователя Carol";
        assert_eq!(classify(text), MessageLabel::Karma);
    }

    #[test]
    fn classifies_mafia_game_end() {
        let text = "Игра окончена!\nПобедители:\nAlice - Мафия\nBob - Дон\n";
        assert_eq!(classify(text), MessageLabel::MafiaGameEnd);
    }

    #[test]
    fn classifies_mafia_profile() {
        let text = "👤 Alice\n💎 Камни: 5\n🎎 Активная роль: Мафия\n💵 Деньги: 100";
        assert_eq!(classify(text), MessageLabel::MafiaProfile);
    }

    #[test]
    fn classifies_bunker_game_end() {
        let text = "Прошли в бункер:\n1. Dan\n2. Eve\n";
        assert_eq!(classify(text), MessageLabel::BunkerGameEnd);
    }

    #[test]
    fn classifies_bunker_profile() {
        let text = "👤 Dan\n💎 Кристаллики: 3\n🎯 Побед: 1\n💵 Деньги: 50";
        assert_eq!(classify(text), MessageLabel::BunkerProfile);
    }

    #[test]
    fn unknown_for_unrelated_text() {
        assert_eq!(classify("just some chat message"), MessageLabel::Unknown);
        assert_eq!(classify(""), MessageLabel::Unknown);
    }

    #[test]
    fn game_end_takes_priority_over_profile_like_substrings() {
        // Game-end text happens to also be checked before profile markers;
        // confirm a message containing both resolves to the game-end label.
        let text = "Игра окончена!\nПобедители:\nAlice - Мафия\n💵 Деньги: 0";
        assert_eq!(classify(text), MessageLabel::MafiaGameEnd);
    }

    proptest::proptest! {
        #[test]
        fn classification_is_total_and_deterministic(s in ".{0,200}") {
            let first = classify(&s);
            let second = classify(&s);
            prop_assert_eq!(first, second);
        }
    }
}
