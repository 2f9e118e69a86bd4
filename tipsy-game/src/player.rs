//! Player identities, the saved roster, and per-session player records.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Reserved id for the synthetic "all players" group entry.
pub const GROUP_PLAYER_ID: &str = "0";

/// Inline capacity matches the usual handful of difficulty tiers.
pub type DifficultyOrder = SmallVec<[i32; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    None,
    Female,
    Male,
}

impl Gender {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Female => "female",
            Self::Male => "male",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "female" => Ok(Self::Female),
            "male" => Ok(Self::Male),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Drink {
    Beer,
    Wine,
    #[serde(rename = "strong_drink")]
    Strong,
    #[default]
    None,
}

impl Drink {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beer => "beer",
            Self::Wine => "wine",
            Self::Strong => "strong_drink",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Drink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Drink {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beer" => Ok(Self::Beer),
            "wine" => Ok(Self::Wine),
            "strong_drink" => Ok(Self::Strong),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

/// A roster entry. Immutable once created; removed from the roster only
/// before a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub drink: Drink,
    #[serde(default)]
    pub single: bool,
}

impl Player {
    /// The synthetic group entry appended to every session.
    #[must_use]
    pub fn group() -> Self {
        Self {
            id: GROUP_PLAYER_ID.to_string(),
            name: "All players".to_string(),
            gender: Gender::None,
            drink: Drink::None,
            single: false,
        }
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        self.id == GROUP_PLAYER_ID
    }
}

/// The saved player roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Roster(pub Vec<Player>);

impl Roster {
    #[must_use]
    pub const fn empty() -> Self {
        Self(vec![])
    }

    /// Load a roster from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid player data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn from_players(players: Vec<Player>) -> Self {
        Self(players)
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&Player> {
        self.0.iter().find(|p| p.id == id)
    }

    pub fn add(&mut self, player: Player) {
        self.0.push(player);
    }

    /// Remove a player before session start. Returns whether an entry left.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|p| p.id != id);
        self.0.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Player> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Player;
    type IntoIter = std::slice::Iter<'a, Player>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A roster entry plus the session-scoped mutable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlayer {
    pub player: Player,
    pub skip_allowance: u32,
    pub difficulty_order: DifficultyOrder,
    pub difficulty_position: usize,
    /// Reserved for bonus-round rules; tracked, not yet consumed.
    #[serde(default)]
    pub total_answered: u32,
}

impl SessionPlayer {
    /// Seat a real player with a freshly shuffled difficulty order.
    #[must_use]
    pub fn seat<R: Rng>(player: Player, difficulties: &[i32], rng: &mut R) -> Self {
        let mut order = DifficultyOrder::from_slice(difficulties);
        order.shuffle(rng);
        Self {
            player,
            skip_allowance: 1,
            difficulty_order: order,
            difficulty_position: 0,
            total_answered: 0,
        }
    }

    /// Seat the group pseudo-player: no skips, no difficulty rotation.
    #[must_use]
    pub fn seat_group() -> Self {
        Self {
            player: Player::group(),
            skip_allowance: 0,
            difficulty_order: DifficultyOrder::new(),
            difficulty_position: 0,
            total_answered: 0,
        }
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        self.player.is_group()
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.player.id
    }

    /// The difficulty tier this player should get next, if they rotate tiers.
    #[must_use]
    pub fn desired_difficulty(&self) -> Option<i32> {
        self.difficulty_order.get(self.difficulty_position).copied()
    }

    /// Step the difficulty cursor, reshuffling the order once it wraps.
    pub fn advance_difficulty<R: Rng>(&mut self, difficulties: &[i32], rng: &mut R) {
        if self.difficulty_order.is_empty() {
            return;
        }
        let next = self.difficulty_position + 1;
        if next >= difficulties.len() {
            let mut order = DifficultyOrder::from_slice(difficulties);
            order.shuffle(rng);
            self.difficulty_order = order;
            self.difficulty_position = 0;
        } else {
            self.difficulty_position = next;
        }
    }
}

/// Players who can stand in for a name placeholder on `target`'s turn:
/// a different gender, marked single, and neither the target nor the group
/// entry. The count also bounds how many placeholders a prompt may carry.
#[must_use]
pub fn eligible_partners<'a>(
    players: &'a [SessionPlayer],
    target: &SessionPlayer,
) -> Vec<&'a SessionPlayer> {
    players
        .iter()
        .filter(|p| {
            p.id() != target.id()
                && p.player.gender != target.player.gender
                && p.player.single
                && !p.is_group()
        })
        .collect()
}
