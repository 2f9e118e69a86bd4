//! The session aggregate root.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::catalog::{Catalog, ContentFilters, Prompt};
use crate::error::EngineError;
use crate::player::{Roster, SessionPlayer};

/// Persisted-blob key for the serialized session state.
pub const SESSION_SAVE_KEY: &str = "party-game-state";
/// Persisted-blob key for the serialized roster.
pub const ROSTER_SAVE_KEY: &str = "tipsy-players";

/// Complete state of one running game session. Created once per game and
/// replaced wholesale by each scheduling transition; collaborators persist a
/// full snapshot after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub seed: u64,
    pub players: Vec<SessionPlayer>,
    pub catalog: Catalog,
    /// Ids of prompts already answered. Grows monotonically within a session.
    #[serde(default)]
    pub answered: BTreeSet<i64>,
    /// Ids that have not yet taken a turn this round, in roster order.
    pub players_remaining: Vec<String>,
    #[serde(default)]
    pub active_player_id: Option<String>,
    #[serde(default)]
    pub active_prompt: Option<Prompt>,
    pub round_number: u32,
    /// Difficulty tiers present in the session catalog; fixed for the session.
    pub distinct_difficulties: Vec<i32>,
    #[serde(default)]
    pub filters: ContentFilters,
}

impl SessionState {
    /// Build the initial state for a roster and content-filter configuration.
    /// No turn is scheduled yet; `active_player_id` and `active_prompt` stay
    /// empty until the first scheduling pass.
    ///
    /// # Errors
    ///
    /// `InsufficientPlayers` for a roster below two entries, `EmptyCatalog`
    /// when filtering leaves nothing to play with.
    pub fn new<R: Rng>(
        roster: &Roster,
        filters: ContentFilters,
        catalog: &Catalog,
        seed: u64,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        if roster.len() < 2 {
            return Err(EngineError::InsufficientPlayers {
                count: roster.len(),
            });
        }
        let catalog = catalog.filtered(filters);
        if catalog.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }
        let distinct_difficulties = catalog.distinct_difficulties();

        let mut players: Vec<SessionPlayer> = roster
            .iter()
            .map(|p| SessionPlayer::seat(p.clone(), &distinct_difficulties, rng))
            .collect();
        players.push(SessionPlayer::seat_group());

        let players_remaining = players.iter().map(|p| p.id().to_string()).collect();

        Ok(Self {
            seed,
            players,
            catalog,
            answered: BTreeSet::new(),
            players_remaining,
            active_player_id: None,
            active_prompt: None,
            round_number: 1,
            distinct_difficulties,
            filters,
        })
    }

    /// Load a session snapshot from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a valid snapshot.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn player(&self, id: &str) -> Option<&SessionPlayer> {
        self.players.iter().find(|p| p.id() == id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut SessionPlayer> {
        self.players.iter_mut().find(|p| p.id() == id)
    }

    #[must_use]
    pub fn active_player(&self) -> Option<&SessionPlayer> {
        self.active_player_id
            .as_deref()
            .and_then(|id| self.player(id))
    }

    /// Skip allowance of the active player; zero when no turn is scheduled.
    #[must_use]
    pub fn active_skip_allowance(&self) -> u32 {
        self.active_player().map_or(0, |p| p.skip_allowance)
    }

    /// Reset the round rotation to every seated id, in seating order.
    pub fn refill_remaining(&mut self) {
        self.players_remaining = self.players.iter().map(|p| p.id().to_string()).collect();
    }
}
