//! High-level session wrapper binding the rng bundle to a session state.

use std::rc::Rc;

use crate::catalog::{Catalog, ContentFilters, Prompt};
use crate::error::EngineError;
use crate::player::{Roster, SessionPlayer};
use crate::punish::{SipLines, sip_lines};
use crate::rng::RngBundle;
use crate::scheduler::{SkipOutcome, advance_turn, first_turn, skip_turn};
use crate::state::SessionState;
use crate::template;

/// One running game. Owns the current state and swaps in the next state on
/// every successful transition; the resolved prompt text is cached per turn
/// so reads never disturb the random streams.
#[derive(Debug, Clone)]
pub struct GameSession {
    state: SessionState,
    rng: Rc<RngBundle>,
    resolved_text: Option<String>,
}

impl GameSession {
    /// Start a session: build the initial state and schedule the opening
    /// turn.
    ///
    /// # Errors
    ///
    /// `InsufficientPlayers`, `EmptyCatalog`, or `NoPromptsAvailable` when
    /// the very first turn cannot be filled.
    pub fn new(
        roster: &Roster,
        filters: ContentFilters,
        catalog: &Catalog,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let rng = Rc::new(RngBundle::from_user_seed(seed));
        let state = SessionState::new(roster, filters, catalog, seed, &mut *rng.shuffle())?;
        let state = first_turn(&state, &rng)?;
        let mut session = Self {
            state,
            rng,
            resolved_text: None,
        };
        session.refresh_resolved_text();
        Ok(session)
    }

    /// Rebuild a session from a persisted snapshot. The random streams are
    /// re-derived from the stored seed; stream positions are not persisted.
    #[must_use]
    pub fn from_state(state: SessionState) -> Self {
        let rng = Rc::new(RngBundle::from_user_seed(state.seed));
        let mut session = Self {
            state,
            rng,
            resolved_text: None,
        };
        session.refresh_resolved_text();
        session
    }

    /// The active player finished their prompt.
    ///
    /// # Errors
    ///
    /// See [`advance_turn`]; on error the current state is left untouched.
    pub fn advance(&mut self) -> Result<(), EngineError> {
        let next = advance_turn(&self.state, &self.rng)?;
        self.state = next;
        self.refresh_resolved_text();
        Ok(())
    }

    /// The active player spends a skip allowance. Refusals keep the state.
    pub fn skip(&mut self) -> SkipOutcome {
        let (next, outcome) = skip_turn(&self.state, &self.rng);
        if outcome == SkipOutcome::Swapped {
            self.state = next;
            self.refresh_resolved_text();
        }
        outcome
    }

    /// Borrow the underlying session state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Apply a closure to the mutable session state.
    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let result = f(&mut self.state);
        self.refresh_resolved_text();
        result
    }

    #[must_use]
    pub fn active_player(&self) -> Option<&SessionPlayer> {
        self.state.active_player()
    }

    #[must_use]
    pub fn active_prompt(&self) -> Option<&Prompt> {
        self.state.active_prompt.as_ref()
    }

    /// The active prompt's display text with name placeholders filled in.
    #[must_use]
    pub fn prompt_text(&self) -> Option<&str> {
        self.resolved_text.as_deref()
    }

    /// Skip allowance of the active player.
    #[must_use]
    pub fn skip_allowance(&self) -> u32 {
        self.state.active_skip_allowance()
    }

    /// Punishment banner for the active turn.
    #[must_use]
    pub fn sip_banner(&self) -> SipLines {
        match (&self.state.active_prompt, self.state.active_player()) {
            (Some(prompt), Some(player)) => sip_lines(prompt, Some(&player.player)),
            _ => SipLines::new(),
        }
    }

    /// Consume the session, returning the underlying state.
    #[must_use]
    pub fn into_state(self) -> SessionState {
        self.state
    }

    fn refresh_resolved_text(&mut self) {
        self.resolved_text = match (&self.state.active_prompt, &self.state.active_player_id) {
            (Some(prompt), Some(active_id)) => Some(template::resolve(
                &prompt.text,
                &self.state.players,
                active_id,
                &mut *self.rng.shuffle(),
            )),
            _ => None,
        };
    }
}
