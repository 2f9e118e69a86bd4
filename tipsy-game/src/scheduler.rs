//! Turn scheduling: whose turn is next, round boundaries, skips.
//!
//! Every transition takes the current state by reference and returns the next
//! state, so callers never observe a half-applied turn.

use log::warn;
use rand::seq::SliceRandom;

use crate::error::EngineError;
use crate::rng::RngBundle;
use crate::selector::{SelectionRequest, select_prompt};
use crate::state::SessionState;

/// Rounds between skip-allowance grants.
const SKIP_BONUS_INTERVAL: u32 = 10;

/// How a skip request resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    /// The active prompt was replaced and one allowance was spent.
    Swapped,
    /// Group turns cannot be skipped.
    GroupTurn,
    /// The active player has no allowance left.
    NoAllowance,
    /// No eligible replacement prompt exists; the turn stands.
    NoReplacement,
    /// No turn is scheduled at all.
    NoActiveTurn,
}

/// Uniformly pick an id from the players still owed a turn this round.
///
/// # Errors
///
/// `NoPlayersRemaining` when the rotation is empty; callers refill first.
pub fn pick_next_player(state: &SessionState, rng: &RngBundle) -> Result<String, EngineError> {
    state
        .players_remaining
        .choose(&mut *rng.turn())
        .cloned()
        .ok_or(EngineError::NoPlayersRemaining)
}

/// Schedule the opening turn of a fresh session. The first pick does not
/// advance anyone's difficulty cursor and answers nothing. Already-scheduled
/// states pass through unchanged.
///
/// # Errors
///
/// Propagates selection failure (`NoPromptsAvailable`) or an empty rotation.
pub fn first_turn(state: &SessionState, rng: &RngBundle) -> Result<SessionState, EngineError> {
    if state.active_player_id.is_some() {
        return Ok(state.clone());
    }
    let mut next = state.clone();
    let player_id = pick_next_player(&next, rng)?;
    schedule_prompt(&mut next, &player_id, rng)?;
    Ok(next)
}

/// The active player finished their prompt: record the answer, rotate to the
/// next player (rolling the round over when everyone has gone), and give the
/// new player a prompt.
///
/// # Errors
///
/// `NoActiveTurn` when nothing is scheduled, `NoPromptsAvailable` when the
/// next turn cannot be filled, `NoPlayersRemaining` on a broken rotation.
pub fn advance_turn(state: &SessionState, rng: &RngBundle) -> Result<SessionState, EngineError> {
    let (active_id, prompt_id) = match (&state.active_player_id, &state.active_prompt) {
        (Some(id), Some(prompt)) => (id.clone(), prompt.id),
        _ => return Err(EngineError::NoActiveTurn),
    };

    let mut next = state.clone();
    next.answered.insert(prompt_id);
    if let Some(player) = next.player_mut(&active_id) {
        player.total_answered += 1;
    }
    next.players_remaining.retain(|id| *id != active_id);

    if next.players_remaining.is_empty() {
        next.refill_remaining();
        next.round_number += 1;
        if next.round_number % SKIP_BONUS_INTERVAL == 1 && next.round_number != 1 {
            for player in next.players.iter_mut().filter(|p| !p.is_group()) {
                player.skip_allowance += 1;
            }
        }
    }

    let player_id = pick_next_player(&next, rng)?;
    let difficulties = next.distinct_difficulties.clone();
    if let Some(player) = next.player_mut(&player_id) {
        player.advance_difficulty(&difficulties, &mut *rng.shuffle());
    }
    schedule_prompt(&mut next, &player_id, rng)?;
    Ok(next)
}

/// The active player spends a skip allowance to swap the current prompt for
/// another at the same difficulty position. Refusals leave the state
/// untouched and are reported back, not raised.
#[must_use]
pub fn skip_turn(state: &SessionState, rng: &RngBundle) -> (SessionState, SkipOutcome) {
    let (Some(active_id), Some(prompt)) = (&state.active_player_id, &state.active_prompt) else {
        warn!("skip refused: no turn is scheduled");
        return (state.clone(), SkipOutcome::NoActiveTurn);
    };
    let Some(active) = state.player(active_id) else {
        warn!("skip refused: active player {active_id} is not seated");
        return (state.clone(), SkipOutcome::NoActiveTurn);
    };
    if active.is_group() {
        warn!("skip refused: group turns cannot be skipped");
        return (state.clone(), SkipOutcome::GroupTurn);
    }
    if active.skip_allowance == 0 {
        warn!("skip refused: player {active_id} has no allowance left");
        return (state.clone(), SkipOutcome::NoAllowance);
    }

    let request = SelectionRequest {
        target: active,
        players: &state.players,
        catalog: &state.catalog,
        answered: &state.answered,
        excluded: Some(prompt.id),
        distinct_difficulties: &state.distinct_difficulties,
    };
    let Ok(replacement) = select_prompt(&request, &mut *rng.prompt()) else {
        warn!("skip refused: no replacement prompt for player {active_id}");
        return (state.clone(), SkipOutcome::NoReplacement);
    };

    let mut next = state.clone();
    if let Some(player) = next.player_mut(active_id) {
        player.skip_allowance = player.skip_allowance.saturating_sub(1);
    }
    next.active_prompt = Some(replacement);
    (next, SkipOutcome::Swapped)
}

/// Select and install a prompt for `player_id`.
fn schedule_prompt(
    state: &mut SessionState,
    player_id: &str,
    rng: &RngBundle,
) -> Result<(), EngineError> {
    let target = state
        .player(player_id)
        .ok_or(EngineError::NoPlayersRemaining)?;
    let request = SelectionRequest {
        target,
        players: &state.players,
        catalog: &state.catalog,
        answered: &state.answered,
        excluded: None,
        distinct_difficulties: &state.distinct_difficulties,
    };
    let prompt = select_prompt(&request, &mut *rng.prompt())?;
    state.active_player_id = Some(player_id.to_string());
    state.active_prompt = Some(prompt);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, ContentFilters};
    use crate::player::{Drink, Gender, Player, Roster};

    fn roster() -> Roster {
        let entries = [
            ("1", Gender::Male),
            ("2", Gender::Female),
            ("3", Gender::Female),
        ];
        Roster::from_players(
            entries
                .iter()
                .map(|(id, gender)| Player {
                    id: (*id).to_string(),
                    name: format!("p{id}"),
                    gender: *gender,
                    drink: Drink::Wine,
                    single: true,
                })
                .collect(),
        )
    }

    fn catalog() -> Catalog {
        let mut prompts = Vec::new();
        for id in 1..=120_i64 {
            prompts.push(crate::catalog::Prompt {
                id,
                created_at: String::new(),
                text: format!("solo prompt {id}"),
                adult: false,
                challenge: false,
                punishment: 2,
                like_count: 0,
                dislike_count: 0,
                difficulty: i32::try_from(id % 3).unwrap() + 1,
                all_players: false,
                need_opposite_gender: false,
            });
        }
        for id in 121..=160_i64 {
            prompts.push(crate::catalog::Prompt {
                id,
                created_at: String::new(),
                text: format!("group prompt {id}"),
                adult: false,
                challenge: false,
                punishment: 2,
                like_count: 0,
                dislike_count: 0,
                difficulty: 1,
                all_players: true,
                need_opposite_gender: false,
            });
        }
        Catalog::from_prompts(prompts)
    }

    fn started(seed: u64) -> (SessionState, RngBundle) {
        let rng = RngBundle::from_user_seed(seed);
        let state = SessionState::new(
            &roster(),
            ContentFilters::default(),
            &catalog(),
            seed,
            &mut *rng.shuffle(),
        )
        .unwrap();
        let state = first_turn(&state, &rng).unwrap();
        (state, rng)
    }

    #[test]
    fn first_turn_schedules_without_answering() {
        let (state, _rng) = started(21);
        assert!(state.active_player_id.is_some());
        assert!(state.active_prompt.is_some());
        assert!(state.answered.is_empty());
        assert_eq!(state.players_remaining.len(), 4);
    }

    #[test]
    fn advance_records_answer_and_rotates() {
        let (state, rng) = started(22);
        let active = state.active_player_id.clone().unwrap();
        let prompt_id = state.active_prompt.as_ref().unwrap().id;
        let next = advance_turn(&state, &rng).unwrap();
        assert!(next.answered.contains(&prompt_id));
        assert_eq!(next.answered.len(), 1);
        assert!(!next.players_remaining.contains(&active));
        assert_eq!(next.player(&active).unwrap().total_answered, 1);
        assert!(next.active_player_id.is_some());
    }

    #[test]
    fn round_rolls_over_after_everyone_went() {
        let (mut state, rng) = started(23);
        // 3 players + group = 4 turns to close round 1.
        for _ in 0..4 {
            assert_eq!(state.round_number, 1);
            state = advance_turn(&state, &rng).unwrap();
        }
        assert_eq!(state.round_number, 2);
        // The refilled rotation holds everyone minus nobody; the new active
        // player was drawn from the full refill.
        assert_eq!(state.players_remaining.len(), 4);
    }

    #[test]
    fn advance_without_turn_aborts_loudly() {
        let rng = RngBundle::from_user_seed(3);
        let state = SessionState::new(
            &roster(),
            ContentFilters::default(),
            &catalog(),
            3,
            &mut *rng.shuffle(),
        )
        .unwrap();
        assert!(matches!(
            advance_turn(&state, &rng),
            Err(EngineError::NoActiveTurn)
        ));
    }

    #[test]
    fn skip_swaps_prompt_and_spends_allowance() {
        let (mut state, rng) = started(24);
        // Make sure a real player is active; group turns refuse skips.
        while state.active_player().unwrap().is_group() {
            state = advance_turn(&state, &rng).unwrap();
        }
        let active = state.active_player_id.clone().unwrap();
        let before = state.active_prompt.as_ref().unwrap().id;
        let (skipped, outcome) = skip_turn(&state, &rng);
        assert_eq!(outcome, SkipOutcome::Swapped);
        assert_ne!(skipped.active_prompt.as_ref().unwrap().id, before);
        assert_eq!(skipped.player(&active).unwrap().skip_allowance, 0);
        assert_eq!(skipped.answered.len(), state.answered.len());
        assert_eq!(skipped.players_remaining, state.players_remaining);

        let (again, outcome) = skip_turn(&skipped, &rng);
        assert_eq!(outcome, SkipOutcome::NoAllowance);
        assert_eq!(again, skipped);
    }

    #[test]
    fn group_turn_refuses_skip() {
        let (mut state, rng) = started(25);
        while !state.active_player().unwrap().is_group() {
            state = advance_turn(&state, &rng).unwrap();
        }
        let (unchanged, outcome) = skip_turn(&state, &rng);
        assert_eq!(outcome, SkipOutcome::GroupTurn);
        assert_eq!(unchanged, state);
    }

    #[test]
    fn skip_bonus_lands_on_round_eleven_only() {
        let (mut state, rng) = started(26);
        let mut rounds_seen = state.round_number;
        while rounds_seen < 11 {
            state = advance_turn(&state, &rng).unwrap();
            rounds_seen = state.round_number;
            if rounds_seen <= 10 {
                for p in &state.players {
                    if !p.is_group() {
                        assert_eq!(p.skip_allowance, 1, "no grant before round 11");
                    }
                }
            }
        }
        assert_eq!(state.round_number, 11);
        for p in &state.players {
            let expected = u32::from(!p.is_group()) * 2;
            assert_eq!(p.skip_allowance, expected);
        }
    }
}

