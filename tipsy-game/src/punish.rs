//! Sip counts for the punishment banner under each prompt.

use smallvec::{SmallVec, smallvec};

use crate::catalog::Prompt;
use crate::numbers::{ceil_f32_to_i32, i32_to_f32};
use crate::player::{Drink, Player};

/// Display lines for one prompt's punishment.
pub type SipLines = SmallVec<[String; 4]>;

const BEER_MULTIPLIER: f32 = 1.5;
const WINE_MULTIPLIER: f32 = 1.0;
const STRONG_MULTIPLIER: f32 = 0.5;

/// Sip multiplier for a drink preference. Non-drinkers pace with the strong
/// drinkers.
#[must_use]
pub const fn drink_multiplier(drink: Drink) -> f32 {
    match drink {
        Drink::Beer => BEER_MULTIPLIER,
        Drink::Wine => WINE_MULTIPLIER,
        Drink::Strong | Drink::None => STRONG_MULTIPLIER,
    }
}

/// Sips owed by `drinker` for refusing `prompt`.
#[must_use]
pub fn sips_for(prompt: &Prompt, drinker: &Player) -> i32 {
    ceil_f32_to_i32(i32_to_f32(prompt.punishment) * drink_multiplier(drinker.drink))
}

/// The punishment banner for the current turn. Group prompts break the count
/// down per drink preference, with a lead-in line for the vote-style and
/// everyone-style phrasings; solo prompts get a single answer-or-drink line.
/// No active drinker means no banner.
#[must_use]
pub fn sip_lines(prompt: &Prompt, drinker: Option<&Player>) -> SipLines {
    let Some(drinker) = drinker else {
        return SipLines::new();
    };

    if prompt.all_players {
        let punishment = prompt.punishment;
        let mut lines: SipLines = smallvec![
            format!(
                "Beer drinker - take {} sips",
                ceil_f32_to_i32(i32_to_f32(punishment) * BEER_MULTIPLIER)
            ),
            format!("Wine drinker - take {punishment} sips"),
            format!(
                "Strong drinks - take {} sips",
                ceil_f32_to_i32(i32_to_f32(punishment) * STRONG_MULTIPLIER)
            ),
        ];
        if prompt.text.contains("Everyone") {
            lines.insert(0, "If your answer is yes and you are:".to_string());
        } else if prompt.text.contains("Who's") || prompt.text.contains("Who\u{2019}s") {
            lines.insert(0, "The person with most votes, if they are:".to_string());
        }
        return lines;
    }

    let sips = sips_for(prompt, drinker);
    let line = if prompt.challenge {
        format!("Do or take {sips} sips")
    } else {
        format!("Answer or take {sips} sips")
    };
    smallvec![line]
}
