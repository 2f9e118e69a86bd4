//! Name-placeholder resolution for prompt text.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::player::{SessionPlayer, eligible_partners};

/// Placeholder token replaced with another player's name at display time.
pub const PLACEHOLDER: &str = "${player}";

/// Number of placeholder tokens in a prompt text.
#[must_use]
pub fn placeholder_count(text: &str) -> usize {
    text.matches(PLACEHOLDER).count()
}

/// Fill placeholder tokens with names drawn from the active player's eligible
/// partners. Text without tokens passes through untouched; with no eligible
/// partner the tokens stay literal (a display fallback, not an error). When
/// the text holds more tokens than partners, names repeat in pool order.
#[must_use]
pub fn resolve<R: Rng>(
    text: &str,
    players: &[SessionPlayer],
    active_player_id: &str,
    rng: &mut R,
) -> String {
    let count = placeholder_count(text);
    if count == 0 {
        return text.to_string();
    }
    let Some(active) = players.iter().find(|p| p.id() == active_player_id) else {
        return text.to_string();
    };
    let mut partners = eligible_partners(players, active);
    if partners.is_empty() {
        return text.to_string();
    }

    partners.shuffle(rng);
    let pool: Vec<&str> = partners
        .iter()
        .take(count.min(partners.len()))
        .map(|p| p.player.name.as_str())
        .collect();

    let mut resolved = text.to_string();
    for i in 0..count {
        resolved = resolved.replacen(PLACEHOLDER, pool[i % pool.len()], 1);
    }
    resolved
}
