use chrono::{DateTime, Local};
use tracing::info;

use crate::models::{GameResult, ResultEntry};

/// Finished games, newest first. Survives across games until cleared.
#[derive(Debug, Default, Clone)]
pub struct GameHistory {
    entries: Vec<GameResult>,
    next_id: u64,
}

impl GameHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, players: Vec<ResultEntry>, finished_at: DateTime<Local>) -> &GameResult {
        self.next_id += 1;
        let result = GameResult {
            id: self.next_id,
            finished_at,
            players,
        };
        info!(
            "Recorded game {} with {} player(s), winner {:?}",
            result.id,
            result.players.len(),
            result.winner().map(|entry| entry.name.as_str())
        );
        self.entries.insert(0, result);
        &self.entries[0]
    }

    pub fn entries(&self) -> &[GameResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Human numbering: the oldest game is #1.
    pub fn game_number(&self, index: usize) -> usize {
        self.entries.len().saturating_sub(index)
    }

    pub fn clear(&mut self) {
        info!("Clearing {} history entries", self.entries.len());
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlayerColor, PlayerId};

    fn entry(id: u64, name: &str, total: i64) -> ResultEntry {
        ResultEntry {
            player_id: PlayerId(id),
            name: name.to_string(),
            color: PlayerColor::Red,
            total,
        }
    }

    #[test]
    fn newest_game_comes_first() {
        let mut history = GameHistory::new();
        history.record(vec![entry(1, "Ana", 1200)], Local::now());
        history.record(vec![entry(2, "Budi", 1100)], Local::now());

        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].players[0].name, "Budi");
        assert_eq!(history.entries()[1].players[0].name, "Ana");
        assert_eq!(history.game_number(0), 2);
        assert_eq!(history.game_number(1), 1);
    }

    #[test]
    fn ids_keep_increasing_after_clear() {
        let mut history = GameHistory::new();
        let first = history.record(vec![entry(1, "Ana", 10)], Local::now()).id;
        history.clear();
        assert!(history.is_empty());
        let second = history.record(vec![entry(1, "Ana", 10)], Local::now()).id;
        assert!(second > first);
    }
}
