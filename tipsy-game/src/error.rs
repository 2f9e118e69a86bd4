//! Engine error taxonomy.

use thiserror::Error;

/// Errors surfaced by session creation, scheduling, and the engine facade.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("a session needs at least 2 players (got {count})")]
    InsufficientPlayers { count: usize },
    #[error("content filters left no prompts in the catalog")]
    EmptyCatalog,
    #[error("no eligible prompt remains for this turn")]
    NoPromptsAvailable,
    #[error("no players remain in the current round")]
    NoPlayersRemaining,
    #[error("advance requested before any turn was scheduled")]
    NoActiveTurn,
    #[error("session persistence failed")]
    Persistence(#[source] anyhow::Error),
    #[error("catalog fetch failed")]
    CatalogFetch(#[source] anyhow::Error),
    #[error("vote write failed")]
    VoteWrite(#[source] anyhow::Error),
}

impl EngineError {
    /// Whether the running session can keep its in-memory state after this
    /// error. Persistence and vote failures degrade; the rest block the
    /// current operation.
    #[must_use]
    pub const fn is_degradable(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::VoteWrite(_))
    }
}
