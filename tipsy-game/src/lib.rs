//! Tipsy Trials Turn Engine
//!
//! Platform-agnostic session logic for the Tipsy Trials party game.
//! This crate rotates turns, selects prompts, and fills name placeholders
//! without UI or platform-specific dependencies.

pub mod catalog;
pub mod error;
pub mod numbers;
pub mod player;
pub mod punish;
pub mod rng;
pub mod scheduler;
pub mod selector;
pub mod session;
pub mod state;
pub mod template;
pub mod votes;

// Re-export commonly used types
pub use catalog::{CATALOG_PAGE_SIZE, Catalog, CatalogSource, ContentFilters, Prompt, fetch_catalog};
pub use error::EngineError;
pub use player::{
    DifficultyOrder, Drink, GROUP_PLAYER_ID, Gender, Player, Roster, SessionPlayer,
    eligible_partners,
};
pub use punish::{SipLines, drink_multiplier, sip_lines, sips_for};
pub use rng::{CountingRng, RngBundle};
pub use scheduler::{SkipOutcome, advance_turn, first_turn, pick_next_player, skip_turn};
pub use selector::{SelectionRequest, select_prompt};
pub use session::GameSession;
pub use state::{ROSTER_SAVE_KEY, SESSION_SAVE_KEY, SessionState};
pub use votes::{VoteKind, VoteStore, record_vote};

use log::warn;

/// Trait for abstracting save/load operations
/// Platform-specific implementations should provide this
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a session snapshot under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    fn save_session(&self, key: &str, state: &SessionState) -> Result<(), Self::Error>;

    /// Load a session snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be loaded.
    fn load_session(&self, key: &str) -> Result<Option<SessionState>, Self::Error>;

    /// Delete a saved session
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_session(&self, key: &str) -> Result<(), Self::Error>;

    /// Save the player roster
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be saved.
    fn save_roster(&self, key: &str, roster: &Roster) -> Result<(), Self::Error>;

    /// Load the player roster
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be loaded.
    fn load_roster(&self, key: &str) -> Result<Option<Roster>, Self::Error>;
}

/// Main engine facade wiring the catalog store, persistence, and vote
/// counters to running sessions. The UI layer talks to this and to the
/// [`GameSession`] it hands out, nothing else.
pub struct GameEngine<C, S, V>
where
    C: CatalogSource,
    S: GameStorage,
    V: VoteStore,
{
    catalog: C,
    storage: S,
    votes: V,
}

impl<C, S, V> GameEngine<C, S, V>
where
    C: CatalogSource,
    S: GameStorage,
    V: VoteStore,
{
    /// Create a new engine with the provided collaborators.
    pub const fn new(catalog: C, storage: S, votes: V) -> Self {
        Self {
            catalog,
            storage,
            votes,
        }
    }

    /// Drain the prompt store and start a session over the filtered catalog.
    /// The opening snapshot is persisted best-effort.
    ///
    /// # Errors
    ///
    /// `CatalogFetch` when the store cannot be drained; otherwise the
    /// session-creation errors of [`GameSession::new`].
    pub fn start_session(
        &self,
        roster: &Roster,
        filters: ContentFilters,
        seed: u64,
    ) -> Result<GameSession, EngineError> {
        let catalog = fetch_catalog(&self.catalog)
            .map_err(|e| EngineError::CatalogFetch(anyhow::Error::new(e)))?;
        let session = GameSession::new(roster, filters, &catalog, seed)?;
        self.persist(&session);
        Ok(session)
    }

    /// Load the persisted snapshot and rebuild the running session, if any.
    ///
    /// # Errors
    ///
    /// `Persistence` when the snapshot exists but cannot be read.
    pub fn resume_session(&self) -> Result<Option<GameSession>, EngineError> {
        let snapshot = self
            .storage
            .load_session(SESSION_SAVE_KEY)
            .map_err(|e| EngineError::Persistence(anyhow::Error::new(e)))?;
        Ok(snapshot.map(GameSession::from_state))
    }

    /// Advance the turn and persist the new snapshot best-effort. A failed
    /// write never blocks the turn; the in-memory state stays authoritative
    /// and the next successful write catches up.
    ///
    /// # Errors
    ///
    /// The scheduling errors of [`GameSession::advance`].
    pub fn advance(&self, session: &mut GameSession) -> Result<(), EngineError> {
        session.advance()?;
        self.persist(session);
        Ok(())
    }

    /// Skip the active prompt; persists only when the prompt was swapped.
    pub fn skip(&self, session: &mut GameSession) -> SkipOutcome {
        let outcome = session.skip();
        if outcome == SkipOutcome::Swapped {
            self.persist(session);
        }
        outcome
    }

    /// Persist a session snapshot, surfacing the failure.
    ///
    /// # Errors
    ///
    /// `Persistence` when the write fails.
    pub fn save_session(&self, session: &GameSession) -> Result<(), EngineError> {
        self.storage
            .save_session(SESSION_SAVE_KEY, session.state())
            .map_err(|e| EngineError::Persistence(anyhow::Error::new(e)))
    }

    /// Drop the persisted session snapshot.
    ///
    /// # Errors
    ///
    /// `Persistence` when the delete fails.
    pub fn delete_session(&self) -> Result<(), EngineError> {
        self.storage
            .delete_session(SESSION_SAVE_KEY)
            .map_err(|e| EngineError::Persistence(anyhow::Error::new(e)))
    }

    /// Save the roster after an add or remove.
    ///
    /// # Errors
    ///
    /// `Persistence` when the write fails.
    pub fn save_roster(&self, roster: &Roster) -> Result<(), EngineError> {
        self.storage
            .save_roster(ROSTER_SAVE_KEY, roster)
            .map_err(|e| EngineError::Persistence(anyhow::Error::new(e)))
    }

    /// Load the saved roster, empty when none was ever saved.
    ///
    /// # Errors
    ///
    /// `Persistence` when the read fails.
    pub fn load_roster(&self) -> Result<Roster, EngineError> {
        self.storage
            .load_roster(ROSTER_SAVE_KEY)
            .map(Option::unwrap_or_default)
            .map_err(|e| EngineError::Persistence(anyhow::Error::new(e)))
    }

    /// Record an advisory vote on a prompt. Purely informational; the UI may
    /// show the vote optimistically whatever this returns.
    ///
    /// # Errors
    ///
    /// `VoteWrite` when the counter read or write fails.
    pub fn record_vote(&self, prompt_id: i64, kind: VoteKind) -> Result<i64, EngineError> {
        record_vote(&self.votes, prompt_id, kind)
            .map_err(|e| EngineError::VoteWrite(anyhow::Error::new(e)))
    }

    fn persist(&self, session: &GameSession) {
        if let Err(err) = self.storage.save_session(SESSION_SAVE_KEY, session.state()) {
            warn!("session snapshot write failed, keeping in-memory state: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Drink, Gender};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    struct FixtureCatalog {
        rows: Vec<Prompt>,
    }

    impl FixtureCatalog {
        fn standard() -> Self {
            let rows = (1..=30_i64)
                .map(|id| Prompt {
                    id,
                    created_at: String::new(),
                    text: if id % 5 == 0 {
                        format!("group prompt {id}")
                    } else {
                        format!("solo prompt {id}")
                    },
                    adult: false,
                    challenge: false,
                    punishment: 2,
                    like_count: 0,
                    dislike_count: 0,
                    difficulty: i32::try_from(id % 3).unwrap() + 1,
                    all_players: id % 5 == 0,
                    need_opposite_gender: false,
                })
                .collect();
            Self { rows }
        }
    }

    impl CatalogSource for FixtureCatalog {
        type Error = Infallible;

        fn fetch_page(&self, offset: usize, _limit: usize) -> Result<Vec<Prompt>, Self::Error> {
            if offset == 0 {
                Ok(self.rows.clone())
            } else {
                Ok(Vec::new())
            }
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStorage {
        sessions: Rc<RefCell<HashMap<String, SessionState>>>,
        rosters: Rc<RefCell<HashMap<String, Roster>>>,
    }

    impl GameStorage for MemoryStorage {
        type Error = Infallible;

        fn save_session(&self, key: &str, state: &SessionState) -> Result<(), Self::Error> {
            self.sessions
                .borrow_mut()
                .insert(key.to_string(), state.clone());
            Ok(())
        }

        fn load_session(&self, key: &str) -> Result<Option<SessionState>, Self::Error> {
            Ok(self.sessions.borrow().get(key).cloned())
        }

        fn delete_session(&self, key: &str) -> Result<(), Self::Error> {
            self.sessions.borrow_mut().remove(key);
            Ok(())
        }

        fn save_roster(&self, key: &str, roster: &Roster) -> Result<(), Self::Error> {
            self.rosters
                .borrow_mut()
                .insert(key.to_string(), roster.clone());
            Ok(())
        }

        fn load_roster(&self, key: &str) -> Result<Option<Roster>, Self::Error> {
            Ok(self.rosters.borrow().get(key).cloned())
        }
    }

    struct FailingStorage;

    impl GameStorage for FailingStorage {
        type Error = std::io::Error;

        fn save_session(&self, _key: &str, _state: &SessionState) -> Result<(), Self::Error> {
            Err(std::io::Error::other("disk full"))
        }

        fn load_session(&self, _key: &str) -> Result<Option<SessionState>, Self::Error> {
            Err(std::io::Error::other("disk full"))
        }

        fn delete_session(&self, _key: &str) -> Result<(), Self::Error> {
            Err(std::io::Error::other("disk full"))
        }

        fn save_roster(&self, _key: &str, _roster: &Roster) -> Result<(), Self::Error> {
            Err(std::io::Error::other("disk full"))
        }

        fn load_roster(&self, _key: &str) -> Result<Option<Roster>, Self::Error> {
            Err(std::io::Error::other("disk full"))
        }
    }

    #[derive(Default)]
    struct MemoryVotes {
        counts: RefCell<HashMap<(i64, &'static str), i64>>,
    }

    impl VoteStore for MemoryVotes {
        type Error = Infallible;

        fn read_count(&self, prompt_id: i64, kind: VoteKind) -> Result<i64, Self::Error> {
            Ok(*self
                .counts
                .borrow()
                .get(&(prompt_id, kind.column()))
                .unwrap_or(&0))
        }

        fn write_count(
            &self,
            prompt_id: i64,
            kind: VoteKind,
            value: i64,
        ) -> Result<(), Self::Error> {
            self.counts
                .borrow_mut()
                .insert((prompt_id, kind.column()), value);
            Ok(())
        }
    }

    fn roster() -> Roster {
        Roster::from_players(vec![
            Player {
                id: "1".to_string(),
                name: "Ada".to_string(),
                gender: Gender::Female,
                drink: Drink::Beer,
                single: true,
            },
            Player {
                id: "2".to_string(),
                name: "Bo".to_string(),
                gender: Gender::Male,
                drink: Drink::Wine,
                single: true,
            },
            Player {
                id: "3".to_string(),
                name: "Cleo".to_string(),
                gender: Gender::Female,
                drink: Drink::Strong,
                single: false,
            },
        ])
    }

    #[test]
    fn engine_starts_advances_and_resumes() {
        let storage = MemoryStorage::default();
        let engine = GameEngine::new(FixtureCatalog::standard(), storage.clone(), MemoryVotes::default());
        let mut session = engine
            .start_session(&roster(), ContentFilters::default(), 0xABCD)
            .unwrap();
        engine.advance(&mut session).unwrap();
        engine.advance(&mut session).unwrap();

        let resumed = engine.resume_session().unwrap().expect("snapshot exists");
        assert_eq!(resumed.state(), session.state());

        engine.delete_session().unwrap();
        assert!(engine.resume_session().unwrap().is_none());
    }

    #[test]
    fn persistence_failure_degrades_but_keeps_playing() {
        let engine = GameEngine::new(FixtureCatalog::standard(), FailingStorage, MemoryVotes::default());
        let mut session = engine
            .start_session(&roster(), ContentFilters::default(), 7)
            .unwrap();
        let before = session.state().answered.len();
        engine.advance(&mut session).unwrap();
        assert_eq!(session.state().answered.len(), before + 1);
        assert!(matches!(
            engine.resume_session(),
            Err(EngineError::Persistence(_))
        ));
    }

    #[test]
    fn roster_roundtrips_and_defaults_empty() {
        let engine = GameEngine::new(
            FixtureCatalog::standard(),
            MemoryStorage::default(),
            MemoryVotes::default(),
        );
        assert!(engine.load_roster().unwrap().is_empty());
        engine.save_roster(&roster()).unwrap();
        assert_eq!(engine.load_roster().unwrap().len(), 3);
    }

    #[test]
    fn votes_pass_through_to_the_store() {
        let engine = GameEngine::new(
            FixtureCatalog::standard(),
            MemoryStorage::default(),
            MemoryVotes::default(),
        );
        assert_eq!(engine.record_vote(5, VoteKind::Like).unwrap(), 1);
        assert_eq!(engine.record_vote(5, VoteKind::Like).unwrap(), 2);
        assert_eq!(engine.record_vote(5, VoteKind::Dislike).unwrap(), 1);
    }

    #[test]
    fn short_roster_is_rejected_before_any_state_exists() {
        let storage = MemoryStorage::default();
        let engine = GameEngine::new(FixtureCatalog::standard(), storage.clone(), MemoryVotes::default());
        let short = Roster::from_players(vec![roster().0[0].clone()]);
        assert!(matches!(
            engine.start_session(&short, ContentFilters::default(), 1),
            Err(EngineError::InsufficientPlayers { count: 1 })
        ));
        assert!(storage.sessions.borrow().is_empty());
    }
}
