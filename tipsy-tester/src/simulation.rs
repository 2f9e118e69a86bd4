//! Deterministic session sweeps against a synthetic catalog.

use anyhow::{Context, Result};
use serde::Serialize;

use tipsy_game::{
    Catalog, ContentFilters, Drink, EngineError, GameSession, Gender, Player, Prompt, Roster,
    SkipOutcome,
};

const ROSTER_NAMES: [&str; 8] = ["Ada", "Bo", "Cleo", "Dot", "Eli", "Fay", "Gus", "Ivy"];
const TIERS: i32 = 4;
const SOLO_PER_TIER: i64 = 40;
const GROUP_PROMPTS: i64 = 30;

/// Configuration for one simulated session.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub players: usize,
    pub max_rounds: u32,
    pub filters: ContentFilters,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            players: 4,
            max_rounds: 25,
            filters: ContentFilters::default(),
        }
    }

    #[must_use]
    pub const fn with_players(mut self, players: usize) -> Self {
        self.players = players;
        self
    }

    #[must_use]
    pub const fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    #[must_use]
    pub const fn with_filters(mut self, filters: ContentFilters) -> Self {
        self.filters = filters;
        self
    }
}

/// Outcome of one simulated session.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub seed: u64,
    pub players: usize,
    pub rounds_completed: u32,
    pub turns_taken: u32,
    pub prompts_answered: usize,
    pub skips_spent: u32,
    pub skips_refused: u32,
    pub group_turns: u32,
    /// The catalog ran out of eligible prompts before `max_rounds`.
    pub ran_dry: bool,
}

/// Aggregate over a sweep of runs.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub runs: usize,
    pub mean_rounds: f64,
    pub mean_answered: f64,
    pub total_skips_spent: u32,
    pub dry_runs: usize,
}

/// A fixed roster of alternating genders and rotating drink preferences.
#[must_use]
pub fn synthetic_roster(players: usize) -> Roster {
    let drinks = [Drink::Beer, Drink::Wine, Drink::Strong, Drink::None];
    Roster::from_players(
        (0..players)
            .map(|i| Player {
                id: (i + 1).to_string(),
                name: ROSTER_NAMES[i % ROSTER_NAMES.len()].to_string(),
                gender: if i % 2 == 0 { Gender::Female } else { Gender::Male },
                drink: drinks[i % drinks.len()],
                single: true,
            })
            .collect(),
    )
}

/// A catalog spanning every tier with a spread of solo, duet, adult,
/// challenge, and group prompts.
#[must_use]
pub fn synthetic_catalog() -> Catalog {
    let mut rows = Vec::new();
    let mut id = 0_i64;
    for tier in 1..=TIERS {
        for n in 0..SOLO_PER_TIER {
            id += 1;
            let text = if n % 5 == 0 {
                format!("Trade drinks with ${{player}} (tier {tier})")
            } else {
                format!("Solo prompt {id} at tier {tier}")
            };
            rows.push(Prompt {
                id,
                created_at: String::new(),
                text,
                adult: n % 7 == 0,
                challenge: n % 6 == 0,
                punishment: i32::try_from(n % 4).unwrap_or(0) + 1,
                like_count: 0,
                dislike_count: 0,
                difficulty: tier,
                all_players: false,
                need_opposite_gender: false,
            });
        }
    }
    for n in 0..GROUP_PROMPTS {
        id += 1;
        rows.push(Prompt {
            id,
            created_at: String::new(),
            text: if n % 2 == 0 {
                format!("Everyone with {n} siblings drinks")
            } else {
                format!("Who's most likely to win round {n}?")
            },
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
    Catalog::from_prompts(rows)
}

/// Play one full session: a skip attempt every third turn, advancing until
/// the round cap or the catalog runs dry.
///
/// # Errors
///
/// Any engine error other than prompt exhaustion fails the run.
pub fn run_session(config: SimulationConfig) -> Result<RunRecord> {
    let roster = synthetic_roster(config.players);
    let catalog = synthetic_catalog();
    let mut session = GameSession::new(&roster, config.filters, &catalog, config.seed)
        .context("session creation")?;

    let mut record = RunRecord {
        seed: config.seed,
        players: config.players,
        rounds_completed: 0,
        turns_taken: 0,
        prompts_answered: 0,
        skips_spent: 0,
        skips_refused: 0,
        group_turns: 0,
        ran_dry: false,
    };

    while session.state().round_number <= config.max_rounds {
        if session
            .active_player()
            .is_some_and(tipsy_game::SessionPlayer::is_group)
        {
            record.group_turns += 1;
        }
        if record.turns_taken % 3 == 0 {
            match session.skip() {
                SkipOutcome::Swapped => record.skips_spent += 1,
                _ => record.skips_refused += 1,
            }
        }
        match session.advance() {
            Ok(()) => record.turns_taken += 1,
            Err(EngineError::NoPromptsAvailable) => {
                record.ran_dry = true;
                break;
            }
            Err(other) => return Err(other).context("advancing the session"),
        }
    }

    record.rounds_completed = session.state().round_number.saturating_sub(1);
    record.prompts_answered = session.state().answered.len();
    Ok(record)
}

/// Collapse a sweep into its headline numbers.
#[must_use]
pub fn summarize(records: &[RunRecord]) -> SweepSummary {
    let runs = records.len();
    let total_rounds: u32 = records.iter().map(|r| r.rounds_completed).sum();
    let total_answered: usize = records.iter().map(|r| r.prompts_answered).sum();
    let divisor = runs.max(1) as f64;
    SweepSummary {
        runs,
        mean_rounds: f64::from(total_rounds) / divisor,
        mean_answered: total_answered as f64 / divisor,
        total_skips_spent: records.iter().map(|r| r.skips_spent).sum(),
        dry_runs: records.iter().filter(|r| r.ran_dry).count(),
    }
}
