//! Prompt selection logic

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;

use crate::catalog::{Catalog, Prompt};
use crate::error::EngineError;
use crate::player::{SessionPlayer, eligible_partners};
use crate::template::placeholder_count;

/// Everything a single prompt pick needs to know about the session.
pub struct SelectionRequest<'a> {
    pub target: &'a SessionPlayer,
    pub players: &'a [SessionPlayer],
    pub catalog: &'a Catalog,
    pub answered: &'a BTreeSet<i64>,
    /// Extra exclusion on top of `answered`; the current prompt during a skip.
    pub excluded: Option<i64>,
    pub distinct_difficulties: &'a [i32],
}

impl SelectionRequest<'_> {
    fn is_excluded(&self, id: i64) -> bool {
        self.answered.contains(&id) || self.excluded == Some(id)
    }
}

/// Pick a prompt for the requested turn.
///
/// Group turns draw uniformly from unanswered group prompts; difficulty is
/// not a filter on that branch. Normal turns start at the player's desired
/// difficulty tier and relax downward through the session's distinct tiers
/// until one yields a candidate. The candidate pool at every tier is bounded
/// by the eligible-partner count so the template resolver can always fill the
/// prompt's placeholders.
///
/// # Errors
///
/// `NoPromptsAvailable` when every tier at or below the desired difficulty
/// is exhausted (or, for group turns, no group prompt remains).
pub fn select_prompt<R: Rng>(
    request: &SelectionRequest<'_>,
    rng: &mut R,
) -> Result<Prompt, EngineError> {
    if request.target.is_group() {
        return pick_group_prompt(request, rng);
    }

    let partners = eligible_partners(request.players, request.target).len();
    let desired = request.target.desired_difficulty();

    // Distinct tiers are sorted ascending; walk the ones at or below the
    // desired tier from highest to lowest.
    let tiers = request
        .distinct_difficulties
        .iter()
        .copied()
        .filter(|tier| desired.is_none_or(|want| *tier <= want))
        .rev();

    for tier in tiers {
        let candidates: Vec<&Prompt> = request
            .catalog
            .prompts
            .iter()
            .filter(|p| {
                !p.all_players
                    && p.difficulty == tier
                    && !request.is_excluded(p.id)
                    && placeholder_count(&p.text) <= partners
            })
            .collect();
        debug!(
            "prompt selection | player:{} tier:{} candidates:{}",
            request.target.id(),
            tier,
            candidates.len()
        );
        if let Some(chosen) = candidates.choose(rng) {
            return Ok((*chosen).clone());
        }
    }
    Err(EngineError::NoPromptsAvailable)
}

fn pick_group_prompt<R: Rng>(
    request: &SelectionRequest<'_>,
    rng: &mut R,
) -> Result<Prompt, EngineError> {
    let candidates: Vec<&Prompt> = request
        .catalog
        .prompts
        .iter()
        .filter(|p| p.all_players && !request.is_excluded(p.id))
        .collect();
    debug!("group prompt selection | candidates:{}", candidates.len());
    candidates
        .choose(rng)
        .map(|p| (*p).clone())
        .ok_or(EngineError::NoPromptsAvailable)
}
