use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerColor {
    #[default]
    Default,
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Pink,
}

impl PlayerColor {
    pub const ALL: [PlayerColor; 7] = [
        PlayerColor::Default,
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Green,
        PlayerColor::Yellow,
        PlayerColor::Purple,
        PlayerColor::Pink,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PlayerColor::Default => "Default",
            PlayerColor::Red => "Red",
            PlayerColor::Blue => "Blue",
            PlayerColor::Green => "Green",
            PlayerColor::Yellow => "Yellow",
            PlayerColor::Purple => "Purple",
            PlayerColor::Pink => "Pink",
        }
    }

    /// Colours offered when adding a player. `Default` is reserved for
    /// players that never picked one.
    pub fn selectable() -> impl Iterator<Item = PlayerColor> {
        Self::ALL
            .into_iter()
            .filter(|color| *color != PlayerColor::Default)
    }

    /// First selectable colour nobody on the roster is using yet.
    pub fn first_unused(used: &HashSet<PlayerColor>) -> Option<PlayerColor> {
        Self::selectable().find(|color| !used.contains(color))
    }
}

/// Opaque reference to a player picture. The scoreboard never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoRef(PathBuf);

impl PhotoRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
    pub photo: Option<PhotoRef>,
}

/// One recorded round. Holds an entry for every player that was on the
/// roster when the round was submitted, minus players deleted since.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Round {
    pub scores: BTreeMap<PlayerId, i64>,
}

impl Round {
    pub fn get(&self, player_id: PlayerId) -> Option<i64> {
        self.scores.get(&player_id).copied()
    }

    /// Missing entries count as zero.
    pub fn score_for(&self, player_id: PlayerId) -> i64 {
        self.get(player_id).unwrap_or(0)
    }
}

/// A roster entry paired with its running total, as rendered on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPlayer {
    pub id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
    pub photo: Option<PhotoRef>,
    pub total: i64,
    /// Zero-based position in the ranked view.
    pub rank: usize,
    /// Position on the roster, i.e. insertion order.
    pub roster_index: usize,
    pub is_leader: bool,
    pub is_last: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
    pub total: i64,
}

impl From<&RankedPlayer> for ResultEntry {
    fn from(ranked: &RankedPlayer) -> Self {
        Self {
            player_id: ranked.id,
            name: ranked.name.clone(),
            color: ranked.color,
            total: ranked.total,
        }
    }
}

/// Snapshot of a finished game, ranked best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub id: u64,
    pub finished_at: DateTime<Local>,
    pub players: Vec<ResultEntry>,
}

impl GameResult {
    pub fn winner(&self) -> Option<&ResultEntry> {
        self.players.first()
    }
}
