//! Prompt catalog: row schema, content filtering, and the paged store read.

use serde::{Deserialize, Serialize};

/// Page size used when draining the remote prompt store.
pub const CATALOG_PAGE_SIZE: usize = 1000;

/// One game prompt as stored in the catalog. Immutable during a session
/// except the vote counters, which only the vote store mutates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(rename = "question")]
    pub text: String,
    #[serde(rename = "dirty", default)]
    pub adult: bool,
    #[serde(default)]
    pub challenge: bool,
    #[serde(default)]
    pub punishment: i32,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub dislike_count: i64,
    #[serde(default)]
    pub difficulty: i32,
    #[serde(default)]
    pub all_players: bool,
    /// Part of the store schema; not consulted by selection.
    #[serde(default)]
    pub need_opposite_gender: bool,
}

/// Session content toggles. `only_adult` wins over the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContentFilters {
    #[serde(default)]
    pub include_adult: bool,
    #[serde(default)]
    pub include_challenges: bool,
    #[serde(default)]
    pub only_adult: bool,
}

impl ContentFilters {
    #[must_use]
    pub const fn allows(self, prompt: &Prompt) -> bool {
        if self.only_adult {
            return prompt.adult;
        }
        if prompt.adult && !self.include_adult {
            return false;
        }
        if prompt.challenge && !self.include_challenges {
            return false;
        }
        true
    }
}

/// Container for the prompts available to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Catalog {
    pub prompts: Vec<Prompt>,
}

impl Catalog {
    /// Create an empty catalog (useful for tests)
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            prompts: Vec::new(),
        }
    }

    /// Load a catalog from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid prompt rows.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn from_prompts(prompts: Vec<Prompt>) -> Self {
        Self { prompts }
    }

    #[must_use]
    pub fn get(&self, id: i64) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Keep only the prompts the session's content toggles allow.
    #[must_use]
    pub fn filtered(&self, filters: ContentFilters) -> Self {
        Self {
            prompts: self
                .prompts
                .iter()
                .filter(|p| filters.allows(p))
                .cloned()
                .collect(),
        }
    }

    /// Sorted, deduplicated difficulty tiers present in this catalog.
    #[must_use]
    pub fn distinct_difficulties(&self) -> Vec<i32> {
        let mut tiers: Vec<i32> = self.prompts.iter().map(|p| p.difficulty).collect();
        tiers.sort_unstable();
        tiers.dedup();
        tiers
    }
}

/// Paged read access to the remote prompt store. Pages are ordered
/// newest-first by the store; an empty page terminates the drain.
pub trait CatalogSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch one page of prompt rows starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched.
    fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Prompt>, Self::Error>;
}

/// Drain every page from the store, deduplicating rows by id across pages.
///
/// # Errors
///
/// Returns the source's error if any page fetch fails.
pub fn fetch_catalog<C: CatalogSource>(source: &C) -> Result<Catalog, C::Error> {
    let mut seen = std::collections::HashSet::new();
    let mut prompts = Vec::new();
    let mut offset = 0;
    loop {
        let page = source.fetch_page(offset, CATALOG_PAGE_SIZE)?;
        if page.is_empty() {
            break;
        }
        for row in page {
            if seen.insert(row.id) {
                prompts.push(row);
            }
        }
        offset += CATALOG_PAGE_SIZE;
    }
    Ok(Catalog::from_prompts(prompts))
}
