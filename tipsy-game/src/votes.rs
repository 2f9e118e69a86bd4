//! Advisory like/dislike counters on the prompt store.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Like,
    Dislike,
}

impl VoteKind {
    /// Store column holding this counter.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Like => "like_count",
            Self::Dislike => "dislike_count",
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Like => f.write_str("like"),
            Self::Dislike => f.write_str("dislike"),
        }
    }
}

/// Counter access on the external prompt store. Writes carry no
/// optimistic-concurrency check; concurrent voters can race and the counters
/// are advisory telemetry only.
pub trait VoteStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the current counter value for one prompt id/column pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter cannot be read.
    fn read_count(&self, prompt_id: i64, kind: VoteKind) -> Result<i64, Self::Error>;

    /// Write a counter value for one prompt id/column pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter cannot be written.
    fn write_count(&self, prompt_id: i64, kind: VoteKind, value: i64) -> Result<(), Self::Error>;
}

/// Read-then-increment one counter. Returns the value written back.
///
/// # Errors
///
/// Propagates the store's read or write error; callers treat either as
/// non-fatal.
pub fn record_vote<V: VoteStore>(
    store: &V,
    prompt_id: i64,
    kind: VoteKind,
) -> Result<i64, V::Error> {
    let current = store.read_count(prompt_id, kind)?;
    let next = current + 1;
    store.write_count(prompt_id, kind, next)?;
    Ok(next)
}
