//! Scoreboard engine: roster, rounds, running totals, ranking and the winner flag.
//!
//! Every operation either applies completely or returns a [`Rejection`] with
//! the state left untouched. The presentation layer owns a single
//! [`Scoreboard`], feeds it [`Intent`]s and re-renders from [`Scoreboard::ranked_view`].

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::models::{
    GameResult, PhotoRef, Player, PlayerColor, PlayerId, RankedPlayer, ResultEntry, Round,
};
use crate::services::config_loader::{CutPending, ScoringConfig, SortDirection, WinnerLatch};
use crate::services::history::GameHistory;
use crate::services::score_input::{self, KeypadKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    EmptyName,
    EmptyRoster,
    NotEnoughPlayers { required: usize, present: usize },
    MissingScores { players: Vec<String> },
    NoRounds,
    UnknownPlayer(PlayerId),
    InvalidScoreText(String),
}

impl Rejection {
    /// Rejections the user should be told about. Everything else is a
    /// silently ignored no-op.
    pub fn is_user_notice(&self) -> bool {
        matches!(
            self,
            Rejection::NotEnoughPlayers { .. } | Rejection::MissingScores { .. }
        )
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyName => write!(f, "player name is empty"),
            Rejection::EmptyRoster => write!(f, "no players in the game"),
            Rejection::NotEnoughPlayers { required, present } => {
                write!(f, "add at least {required} players (currently {present})")
            }
            Rejection::MissingScores { players } => {
                write!(f, "enter a score for every player: {}", players.join(", "))
            }
            Rejection::NoRounds => write!(f, "no rounds recorded"),
            Rejection::UnknownPlayer(id) => write!(f, "unknown player {id}"),
            Rejection::InvalidScoreText(raw) => write!(f, "not a score: {raw:?}"),
        }
    }
}

impl std::error::Error for Rejection {}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WinnerChange {
    #[default]
    Unchanged,
    Declared(String),
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Setup,
    Active,
    WinnerDeclared,
}

/// The part of the board that "Finish game" wipes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameSession {
    players: Vec<Player>,
    rounds: Vec<Round>,
    pending: HashMap<PlayerId, String>,
    winner: Option<PlayerId>,
}

impl GameSession {
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == player_id)
    }

    /// Raw text of the score being typed for a player; empty when untouched.
    pub fn pending_text(&self, player_id: PlayerId) -> &str {
        self.pending
            .get(&player_id)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Current name of the flagged winner, read from the roster.
    pub fn winner(&self) -> Option<&str> {
        self.winner
            .and_then(|player_id| self.player(player_id))
            .map(|player| player.name.as_str())
    }

    pub fn winner_id(&self) -> Option<PlayerId> {
        self.winner
    }

    fn position(&self, player_id: PlayerId) -> Option<usize> {
        self.players.iter().position(|player| player.id == player_id)
    }

    fn empty_pending(&self) -> HashMap<PlayerId, String> {
        self.players
            .iter()
            .map(|player| (player.id, String::new()))
            .collect()
    }
}

/// A user action forwarded by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    AddPlayer {
        name: String,
        color: PlayerColor,
        photo: Option<PhotoRef>,
    },
    SubmitRound,
    UndoLastRound,
    SetInProgressScore {
        player_id: PlayerId,
        raw: String,
    },
    PressKey {
        player_id: PlayerId,
        key: KeypadKey,
    },
    CutPlayerScore(PlayerId),
    DeletePlayer(PlayerId),
    RenamePlayer {
        player_id: PlayerId,
        name: String,
    },
    SetPlayerPhoto {
        player_id: PlayerId,
        photo: Option<PhotoRef>,
    },
    FinishGame {
        save_to_history: bool,
    },
    ClearHistory,
}

/// What an accepted intent changed beyond the board itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Applied {
    pub winner: WinnerChange,
    pub added_player: Option<PlayerId>,
    pub finished: Option<GameResult>,
}

impl Applied {
    fn winner(winner: WinnerChange) -> Self {
        Self {
            winner,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scoreboard {
    config: ScoringConfig,
    session: GameSession,
    history: GameHistory,
    next_player_id: u64,
}

impl Scoreboard {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            session: GameSession::default(),
            history: GameHistory::new(),
            next_player_id: 0,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn history(&self) -> &GameHistory {
        &self.history
    }

    pub fn phase(&self) -> GamePhase {
        if self.session.players.is_empty() {
            GamePhase::Setup
        } else if self.session.winner.is_some() {
            GamePhase::WinnerDeclared
        } else {
            GamePhase::Active
        }
    }

    pub fn used_colors(&self) -> HashSet<PlayerColor> {
        self.session
            .players
            .iter()
            .map(|player| player.color)
            .collect()
    }

    pub fn suggested_color(&self) -> Option<PlayerColor> {
        PlayerColor::first_unused(&self.used_colors())
    }

    pub fn apply(&mut self, intent: Intent) -> Result<Applied, Rejection> {
        debug!("Applying {:?}", intent);
        let result = match intent {
            Intent::AddPlayer { name, color, photo } => self.add_player(&name, color, photo),
            Intent::SubmitRound => self.submit_round(),
            Intent::UndoLastRound => self.undo_last_round(),
            Intent::SetInProgressScore { player_id, raw } => {
                self.set_in_progress_score(player_id, &raw)
            }
            Intent::PressKey { player_id, key } => self.press_key(player_id, key),
            Intent::CutPlayerScore(player_id) => self.cut_player_score(player_id),
            Intent::DeletePlayer(player_id) => self.delete_player(player_id),
            Intent::RenamePlayer { player_id, name } => self.rename_player(player_id, &name),
            Intent::SetPlayerPhoto { player_id, photo } => self.set_player_photo(player_id, photo),
            Intent::FinishGame { save_to_history } => Ok(self.finish_game(save_to_history)),
            Intent::ClearHistory => Ok(self.clear_history()),
        };

        if let Err(rejection) = &result {
            if rejection.is_user_notice() {
                warn!("Declined: {rejection}");
            } else {
                debug!("Declined: {rejection}");
            }
        }
        result
    }

    pub fn add_player(
        &mut self,
        name: &str,
        color: PlayerColor,
        photo: Option<PhotoRef>,
    ) -> Result<Applied, Rejection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Rejection::EmptyName);
        }

        self.next_player_id += 1;
        let id = PlayerId(self.next_player_id);
        self.session.players.push(Player {
            id,
            name: name.to_string(),
            color,
            photo,
        });
        self.session.pending.insert(id, String::new());
        info!("Added player {} {} ({})", id, name, color.name());

        Ok(Applied {
            winner: self.check_winner(),
            added_player: Some(id),
            finished: None,
        })
    }

    pub fn submit_round(&mut self) -> Result<Applied, Rejection> {
        let present = self.session.players.len();
        if present == 0 {
            return Err(Rejection::EmptyRoster);
        }
        if present < self.config.min_players_to_submit {
            return Err(Rejection::NotEnoughPlayers {
                required: self.config.min_players_to_submit,
                present,
            });
        }
        if self.config.require_every_score {
            let missing: Vec<String> = self
                .session
                .players
                .iter()
                .filter(|player| score_input::is_blank(self.session.pending_text(player.id)))
                .map(|player| player.name.clone())
                .collect();
            if !missing.is_empty() {
                return Err(Rejection::MissingScores { players: missing });
            }
        }

        let round = Round {
            scores: self
                .session
                .players
                .iter()
                .map(|player| {
                    (
                        player.id,
                        score_input::parse_score(self.session.pending_text(player.id)),
                    )
                })
                .collect(),
        };
        self.session.rounds.push(round);
        self.session.pending = self.session.empty_pending();
        info!(
            "Submitted round {} for {} player(s)",
            self.session.rounds.len(),
            present
        );

        Ok(Applied::winner(self.check_winner()))
    }

    pub fn undo_last_round(&mut self) -> Result<Applied, Rejection> {
        let Some(last) = self.session.rounds.pop() else {
            return Err(Rejection::NoRounds);
        };

        // Players that joined after this round get a blank slot.
        self.session.pending = self
            .session
            .players
            .iter()
            .map(|player| {
                let text = last
                    .get(player.id)
                    .map(|score| score.to_string())
                    .unwrap_or_default();
                (player.id, text)
            })
            .collect();
        info!(
            "Undid round {}, scores moved back to input",
            self.session.rounds.len() + 1
        );

        Ok(Applied::winner(self.check_winner()))
    }

    pub fn set_in_progress_score(
        &mut self,
        player_id: PlayerId,
        raw: &str,
    ) -> Result<Applied, Rejection> {
        if self.session.position(player_id).is_none() {
            return Err(Rejection::UnknownPlayer(player_id));
        }
        if !score_input::is_valid_score_text(raw) {
            return Err(Rejection::InvalidScoreText(raw.to_string()));
        }

        self.session.pending.insert(player_id, raw.to_string());
        Ok(Applied::winner(self.check_winner()))
    }

    pub fn press_key(&mut self, player_id: PlayerId, key: KeypadKey) -> Result<Applied, Rejection> {
        let next = score_input::apply_key(self.session.pending_text(player_id), key);
        self.set_in_progress_score(player_id, &next)
    }

    pub fn cut_player_score(&mut self, player_id: PlayerId) -> Result<Applied, Rejection> {
        let Some(index) = self.session.position(player_id) else {
            return Err(Rejection::UnknownPlayer(player_id));
        };

        for round in &mut self.session.rounds {
            if let Some(score) = round.scores.get_mut(&player_id) {
                *score = 0;
            }
        }
        match self.config.cut_pending {
            CutPending::Clear => {
                self.session.pending.insert(player_id, String::new());
            }
            CutPending::Zero => {
                self.session.pending.insert(player_id, "0".to_string());
            }
            CutPending::Keep => {}
        }
        info!(
            "Cut all scores for {}",
            self.session.players[index].name
        );

        Ok(Applied::winner(self.check_winner()))
    }

    pub fn delete_player(&mut self, player_id: PlayerId) -> Result<Applied, Rejection> {
        let Some(index) = self.session.position(player_id) else {
            return Err(Rejection::UnknownPlayer(player_id));
        };

        let removed = self.session.players.remove(index);
        for round in &mut self.session.rounds {
            round.scores.remove(&player_id);
        }
        self.session.pending.remove(&player_id);
        info!("Deleted player {} {}", removed.id, removed.name);

        Ok(Applied::winner(self.check_winner()))
    }

    pub fn rename_player(&mut self, player_id: PlayerId, name: &str) -> Result<Applied, Rejection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Rejection::EmptyName);
        }
        let Some(index) = self.session.position(player_id) else {
            return Err(Rejection::UnknownPlayer(player_id));
        };

        let player = &mut self.session.players[index];
        info!("Renamed player {} from {} to {}", player.id, player.name, name);
        player.name = name.to_string();
        Ok(Applied::default())
    }

    pub fn set_player_photo(
        &mut self,
        player_id: PlayerId,
        photo: Option<PhotoRef>,
    ) -> Result<Applied, Rejection> {
        let Some(index) = self.session.position(player_id) else {
            return Err(Rejection::UnknownPlayer(player_id));
        };
        self.session.players[index].photo = photo;
        Ok(Applied::default())
    }

    /// Sum of recorded rounds only.
    pub fn recorded_total(&self, player_id: PlayerId) -> i64 {
        self.session
            .rounds
            .iter()
            .fold(0i64, |acc, round| acc.saturating_add(round.score_for(player_id)))
    }

    /// Recorded total plus whatever is typed in the input slot.
    pub fn total_for(&self, player_id: PlayerId) -> i64 {
        self.recorded_total(player_id)
            .saturating_add(score_input::parse_score(self.session.pending_text(player_id)))
    }

    /// Totals in roster order.
    pub fn compute_totals(&self) -> Vec<(PlayerId, i64)> {
        self.session
            .players
            .iter()
            .map(|player| (player.id, self.total_for(player.id)))
            .collect()
    }

    pub fn ranked_view(&self) -> Vec<RankedPlayer> {
        let mut ranked: Vec<RankedPlayer> = self
            .session
            .players
            .iter()
            .zip(self.compute_totals())
            .enumerate()
            .map(|(roster_index, (player, (_, total)))| RankedPlayer {
                id: player.id,
                name: player.name.clone(),
                color: player.color,
                photo: player.photo.clone(),
                total,
                rank: 0,
                roster_index,
                is_leader: false,
                is_last: false,
            })
            .collect();

        // Stable sort keeps roster order among equal totals.
        match self.config.sort_direction {
            SortDirection::HighestWins => ranked.sort_by(|a, b| b.total.cmp(&a.total)),
            SortDirection::LowestWins => ranked.sort_by(|a, b| a.total.cmp(&b.total)),
        }

        let len = ranked.len();
        for (rank, entry) in ranked.iter_mut().enumerate() {
            entry.rank = rank;
            entry.is_leader = len > 1 && rank == 0;
            entry.is_last = len > 1 && rank == len - 1;
        }
        ranked
    }

    /// Re-evaluates the winner flag against the current totals. Called after
    /// every change that can move a total or shrink the roster.
    pub fn check_winner(&mut self) -> WinnerChange {
        let threshold = self.config.winner_threshold;

        // A flag pointing at a player who left the roster never survives,
        // whatever the latch setting.
        let dropped = match self.session.winner {
            Some(winner_id) if self.session.player(winner_id).is_none() => {
                info!("Winner {} left the game, flag dropped", winner_id);
                self.session.winner = None;
                true
            }
            _ => false,
        };
        let ranked = self.ranked_view();
        let reached = match self.config.sort_direction {
            SortDirection::HighestWins => ranked.first().is_some_and(|leader| leader.total >= threshold),
            // Someone hitting the threshold ends the game; the lowest total wins it.
            SortDirection::LowestWins => ranked.iter().any(|entry| entry.total >= threshold),
        };

        if reached {
            if self.session.winner.is_none()
                && let Some(leader) = ranked.first()
            {
                info!(
                    "Winner declared: {} with {} (threshold {})",
                    leader.name, leader.total, threshold
                );
                self.session.winner = Some(leader.id);
                return WinnerChange::Declared(leader.name.clone());
            }
            return if dropped {
                WinnerChange::Cleared
            } else {
                WinnerChange::Unchanged
            };
        }

        if self.session.winner.is_some() && self.config.winner_latch == WinnerLatch::ClearBelowThreshold {
            info!("Winner flag cleared, nobody is at {} any more", threshold);
            self.session.winner = None;
            return WinnerChange::Cleared;
        }
        if dropped {
            WinnerChange::Cleared
        } else {
            WinnerChange::Unchanged
        }
    }

    /// Ends the current game. The ranked totals, pending input included, are
    /// saved to history when requested and there is anyone to save.
    pub fn finish_game(&mut self, save_to_history: bool) -> Applied {
        let finished = if save_to_history && !self.session.players.is_empty() {
            let entries: Vec<ResultEntry> = self.ranked_view().iter().map(ResultEntry::from).collect();
            Some(self.history.record(entries, Local::now()).clone())
        } else {
            None
        };

        let winner = if self.session.winner.is_some() {
            WinnerChange::Cleared
        } else {
            WinnerChange::Unchanged
        };
        info!(
            "Game finished after {} round(s), saved: {}",
            self.session.rounds.len(),
            finished.is_some()
        );
        self.session = GameSession::default();

        Applied {
            winner,
            added_player: None,
            finished,
        }
    }

    pub fn clear_history(&mut self) -> Applied {
        self.history.clear();
        Applied::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(config: ScoringConfig, names: &[&str]) -> (Scoreboard, Vec<PlayerId>) {
        let mut board = Scoreboard::new(config);
        let ids = names
            .iter()
            .map(|name| {
                board
                    .add_player(name, PlayerColor::Red, None)
                    .unwrap()
                    .added_player
                    .unwrap()
            })
            .collect();
        (board, ids)
    }

    /// Types every score, submits, and returns the winner changes seen on the way.
    fn play_round(board: &mut Scoreboard, ids: &[PlayerId], scores: &[i64]) -> Vec<WinnerChange> {
        let mut changes = Vec::new();
        for (id, score) in ids.iter().zip(scores) {
            changes.push(board.set_in_progress_score(*id, &score.to_string()).unwrap().winner);
        }
        changes.push(board.submit_round().unwrap().winner);
        changes.retain(|change| *change != WinnerChange::Unchanged);
        changes
    }

    fn totals(board: &Scoreboard) -> Vec<i64> {
        board.compute_totals().into_iter().map(|(_, total)| total).collect()
    }

    #[test]
    fn add_player_trims_and_rejects_blank_names() {
        let mut board = Scoreboard::new(ScoringConfig::default());
        assert_eq!(
            board.add_player("   ", PlayerColor::Red, None),
            Err(Rejection::EmptyName)
        );
        assert!(board.session().players().is_empty());

        let id = board
            .add_player("  Ana ", PlayerColor::Red, None)
            .unwrap()
            .added_player
            .unwrap();
        assert_eq!(board.session().player(id).unwrap().name, "Ana");
        assert_eq!(board.session().pending_text(id), "");
    }

    #[test]
    fn ids_are_never_reused() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["Ana", "Budi"]);
        board.delete_player(ids[1]).unwrap();
        let next = board
            .add_player("Citra", PlayerColor::Blue, None)
            .unwrap()
            .added_player
            .unwrap();
        assert!(!ids.contains(&next));
        assert_eq!(board.session().player(ids[0]).unwrap().id, ids[0]);
    }

    #[test]
    fn two_rounds_rank_descending() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A", "B"]);
        play_round(&mut board, &ids, &[50, 30]);
        play_round(&mut board, &ids, &[20, 60]);

        assert_eq!(totals(&board), vec![70, 90]);
        let ranked = board.ranked_view();
        assert_eq!(ranked[0].name, "B");
        assert_eq!(ranked[0].total, 90);
        assert!(ranked[0].is_leader);
        assert_eq!(ranked[1].name, "A");
        assert_eq!(ranked[1].total, 70);
        assert!(ranked[1].is_last);
    }

    #[test]
    fn ties_keep_roster_order() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A", "B", "C"]);
        play_round(&mut board, &ids, &[10, 40, 40]);
        let names: Vec<String> = board.ranked_view().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[test]
    fn lowest_wins_sorts_ascending() {
        let config = ScoringConfig {
            sort_direction: SortDirection::LowestWins,
            ..ScoringConfig::default()
        };
        let (mut board, ids) = board_with(config, &["A", "B"]);
        play_round(&mut board, &ids, &[50, 30]);
        let ranked = board.ranked_view();
        assert_eq!(ranked[0].name, "B");
        assert_eq!(ranked[0].roster_index, 1);
    }

    #[test]
    fn single_player_gets_no_badges() {
        let (board, _) = board_with(ScoringConfig::default(), &["Solo"]);
        let ranked = board.ranked_view();
        assert!(!ranked[0].is_leader);
        assert!(!ranked[0].is_last);
    }

    #[test]
    fn submit_on_empty_roster_is_declined() {
        let mut board = Scoreboard::new(ScoringConfig::default());
        assert_eq!(board.submit_round(), Err(Rejection::EmptyRoster));
        assert!(board.session().rounds().is_empty());
    }

    #[test]
    fn blank_and_minus_submit_as_zero() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A", "B", "C"]);
        board.set_in_progress_score(ids[0], "-").unwrap();
        board.set_in_progress_score(ids[1], "15").unwrap();
        board.submit_round().unwrap();

        let round = &board.session().rounds()[0];
        assert_eq!(round.scores.len(), 3);
        assert_eq!(round.get(ids[0]), Some(0));
        assert_eq!(round.get(ids[1]), Some(15));
        assert_eq!(round.get(ids[2]), Some(0));
        assert!(ids.iter().all(|id| board.session().pending_text(*id).is_empty()));
    }

    #[test]
    fn pending_input_counts_toward_totals() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A"]);
        play_round(&mut board, &ids, &[100]);
        board.set_in_progress_score(ids[0], "-25").unwrap();
        assert_eq!(board.total_for(ids[0]), 75);
        assert_eq!(board.recorded_total(ids[0]), 100);
    }

    #[test]
    fn malformed_score_text_is_ignored() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A"]);
        board.set_in_progress_score(ids[0], "12").unwrap();
        assert_eq!(
            board.set_in_progress_score(ids[0], "12a"),
            Err(Rejection::InvalidScoreText("12a".to_string()))
        );
        assert_eq!(board.session().pending_text(ids[0]), "12");
        assert_eq!(
            board.set_in_progress_score(PlayerId(999), "1"),
            Err(Rejection::UnknownPlayer(PlayerId(999)))
        );
    }

    #[test]
    fn keypad_presses_go_through_validation() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A"]);
        for key in [KeypadKey::Minus, KeypadKey::Digit(4), KeypadKey::Digit(0)] {
            board
                .apply(Intent::PressKey {
                    player_id: ids[0],
                    key,
                })
                .unwrap();
        }
        assert_eq!(board.session().pending_text(ids[0]), "-40");
        board
            .apply(Intent::PressKey {
                player_id: ids[0],
                key: KeypadKey::Backspace,
            })
            .unwrap();
        assert_eq!(board.session().pending_text(ids[0]), "-4");
    }

    #[test]
    fn undo_moves_last_round_back_into_input() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A", "B"]);
        play_round(&mut board, &ids, &[50, 30]);
        play_round(&mut board, &ids, &[20, -60]);

        board.undo_last_round().unwrap();
        assert_eq!(board.session().rounds().len(), 1);
        assert_eq!(board.session().pending_text(ids[0]), "20");
        assert_eq!(board.session().pending_text(ids[1]), "-60");
        assert_eq!(totals(&board), vec![70, -30]);
    }

    #[test]
    fn undo_without_rounds_is_declined() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A"]);
        board.set_in_progress_score(ids[0], "5").unwrap();
        assert_eq!(board.undo_last_round(), Err(Rejection::NoRounds));
        assert_eq!(board.session().pending_text(ids[0]), "5");
    }

    #[test]
    fn undo_leaves_late_joiners_blank() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A"]);
        play_round(&mut board, &ids, &[10]);
        let late = board
            .add_player("Late", PlayerColor::Blue, None)
            .unwrap()
            .added_player
            .unwrap();
        board.undo_last_round().unwrap();
        assert_eq!(board.session().pending_text(ids[0]), "10");
        assert_eq!(board.session().pending_text(late), "");
    }

    #[test]
    fn cut_zeroes_history_and_clears_input() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A", "B"]);
        play_round(&mut board, &ids, &[50, 30]);
        play_round(&mut board, &ids, &[20, 60]);
        board.set_in_progress_score(ids[0], "7").unwrap();

        board.cut_player_score(ids[0]).unwrap();
        assert_eq!(totals(&board), vec![0, 90]);
        assert_eq!(board.session().pending_text(ids[0]), "");
        assert_eq!(board.session().players().len(), 2);
        assert!(board.session().rounds().iter().all(|r| r.get(ids[0]) == Some(0)));
    }

    #[test]
    fn cut_pending_policy_is_configurable() {
        for (policy, expected) in [(CutPending::Zero, "0"), (CutPending::Keep, "7")] {
            let config = ScoringConfig {
                cut_pending: policy,
                ..ScoringConfig::default()
            };
            let (mut board, ids) = board_with(config, &["A"]);
            play_round(&mut board, &ids, &[40]);
            board.set_in_progress_score(ids[0], "7").unwrap();
            board.cut_player_score(ids[0]).unwrap();
            assert_eq!(board.session().pending_text(ids[0]), expected);
            assert_eq!(board.recorded_total(ids[0]), 0);
        }
    }

    #[test]
    fn delete_drops_the_players_entries_everywhere() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A", "B", "C"]);
        play_round(&mut board, &ids, &[1, 2, 3]);
        play_round(&mut board, &ids, &[10, 20, 30]);
        board.set_in_progress_score(ids[1], "5").unwrap();

        board.delete_player(ids[1]).unwrap();
        assert!(board.session().player(ids[1]).is_none());
        for round in board.session().rounds() {
            assert_eq!(round.scores.len(), 2);
            assert_eq!(round.get(ids[1]), None);
        }
        assert_eq!(board.compute_totals(), vec![(ids[0], 11), (ids[2], 33)]);
        assert_eq!(board.delete_player(ids[1]), Err(Rejection::UnknownPlayer(ids[1])));
    }

    #[test]
    fn rename_requires_a_name() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A"]);
        assert_eq!(board.rename_player(ids[0], " "), Err(Rejection::EmptyName));
        board.rename_player(ids[0], " Dewi ").unwrap();
        assert_eq!(board.session().player(ids[0]).unwrap().name, "Dewi");
    }

    #[test]
    fn winner_is_declared_once_and_cleared_by_undo() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A", "B"]);
        play_round(&mut board, &ids, &[980, 100]);
        assert_eq!(board.phase(), GamePhase::Active);

        let changes = play_round(&mut board, &ids, &[25, 0]);
        assert_eq!(changes, vec![WinnerChange::Declared("A".to_string())]);
        assert_eq!(board.phase(), GamePhase::WinnerDeclared);

        let again = play_round(&mut board, &ids, &[10, 0]);
        assert!(again.is_empty());

        board.undo_last_round().unwrap();
        // The undone round sits in the input and still counts.
        assert_eq!(board.session().winner(), Some("A"));
        board.set_in_progress_score(ids[0], "").unwrap();
        let undone = board.undo_last_round().unwrap();
        assert_eq!(undone.winner, WinnerChange::Unchanged);
        let cleared = board.set_in_progress_score(ids[0], "").unwrap();
        assert_eq!(cleared.winner, WinnerChange::Cleared);
        assert_eq!(board.session().winner(), None);
        assert_eq!(board.phase(), GamePhase::Active);
    }

    #[test]
    fn deleting_the_winner_hands_the_flag_to_the_new_leader() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A", "B"]);
        play_round(&mut board, &ids, &[1010, 1001]);
        assert_eq!(board.session().winner_id(), Some(ids[0]));

        let applied = board.delete_player(ids[0]).unwrap();
        assert_eq!(applied.winner, WinnerChange::Declared("B".to_string()));
        assert_eq!(board.session().winner(), Some("B"));

        board.rename_player(ids[1], "Bee").unwrap();
        assert_eq!(board.session().winner(), Some("Bee"));
        assert_eq!(board.session().winner_id(), Some(ids[1]));
    }

    #[test]
    fn deleting_the_winner_clears_the_flag_when_nobody_else_qualifies() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A", "B"]);
        play_round(&mut board, &ids, &[1010, 200]);

        let applied = board.delete_player(ids[0]).unwrap();
        assert_eq!(applied.winner, WinnerChange::Cleared);
        assert_eq!(board.session().winner(), None);
        assert_eq!(board.phase(), GamePhase::Active);
    }

    #[test]
    fn sticky_flag_goes_with_an_empty_roster() {
        let config = ScoringConfig {
            winner_latch: WinnerLatch::Sticky,
            ..ScoringConfig::default()
        };
        let (mut board, ids) = board_with(config, &["A"]);
        play_round(&mut board, &ids, &[1000]);
        assert_eq!(board.phase(), GamePhase::WinnerDeclared);

        let applied = board.delete_player(ids[0]).unwrap();
        assert_eq!(applied.winner, WinnerChange::Cleared);
        assert_eq!(board.phase(), GamePhase::Setup);
        assert_eq!(board.session().winner_id(), None);

        let c = board
            .add_player("C", PlayerColor::Blue, None)
            .unwrap()
            .added_player
            .unwrap();
        let changes = play_round(&mut board, &[c], &[2000]);
        assert_eq!(changes, vec![WinnerChange::Declared("C".to_string())]);
        assert_eq!(board.session().winner(), Some("C"));
    }

    #[test]
    fn sticky_latch_keeps_the_winner() {
        let config = ScoringConfig {
            winner_latch: WinnerLatch::Sticky,
            ..ScoringConfig::default()
        };
        let (mut board, ids) = board_with(config, &["A", "B"]);
        play_round(&mut board, &ids, &[980, 0]);
        play_round(&mut board, &ids, &[25, 0]);
        assert_eq!(board.session().winner(), Some("A"));

        board.cut_player_score(ids[0]).unwrap();
        assert_eq!(board.session().winner(), Some("A"));
        assert_eq!(board.phase(), GamePhase::WinnerDeclared);
    }

    #[test]
    fn lowest_wins_declares_the_lowest_total() {
        let config = ScoringConfig {
            sort_direction: SortDirection::LowestWins,
            winner_threshold: 100,
            ..ScoringConfig::default()
        };
        let (mut board, ids) = board_with(config, &["A", "B"]);
        let changes = play_round(&mut board, &ids, &[120, 40]);
        assert_eq!(changes, vec![WinnerChange::Declared("B".to_string())]);
        assert_eq!(board.session().winner(), Some("B"));
    }

    #[test]
    fn table_variant_requires_two_players_and_every_score() {
        let config = ScoringConfig {
            min_players_to_submit: 2,
            require_every_score: true,
            ..ScoringConfig::default()
        };
        let (mut board, ids) = board_with(config, &["A"]);
        let err = board.submit_round().unwrap_err();
        assert_eq!(
            err,
            Rejection::NotEnoughPlayers {
                required: 2,
                present: 1
            }
        );
        assert!(err.is_user_notice());

        let b = board
            .add_player("B", PlayerColor::Blue, None)
            .unwrap()
            .added_player
            .unwrap();
        board.set_in_progress_score(ids[0], "10").unwrap();
        board.set_in_progress_score(b, "-").unwrap();
        assert_eq!(
            board.submit_round(),
            Err(Rejection::MissingScores {
                players: vec!["B".to_string()]
            })
        );
        assert!(board.session().rounds().is_empty());

        board.set_in_progress_score(b, "0").unwrap();
        board.submit_round().unwrap();
        assert_eq!(board.session().rounds().len(), 1);
    }

    #[test]
    fn finish_game_snapshots_totals_and_resets() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A", "B"]);
        play_round(&mut board, &ids, &[50, 30]);
        board.set_in_progress_score(ids[1], "40").unwrap();
        let expected: Vec<i64> = vec![70, 50];

        let applied = board.apply(Intent::FinishGame { save_to_history: true }).unwrap();
        let result = applied.finished.unwrap();
        let saved: Vec<i64> = result.players.iter().map(|entry| entry.total).collect();
        assert_eq!(saved, expected);
        assert_eq!(result.players[0].name, "B");

        assert_eq!(board.history().len(), 1);
        assert!(board.session().players().is_empty());
        assert!(board.session().rounds().is_empty());
        assert_eq!(board.session().pending_text(ids[0]), "");
        assert_eq!(board.phase(), GamePhase::Setup);
    }

    #[test]
    fn finish_without_saving_or_players_leaves_history_alone() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A"]);
        play_round(&mut board, &ids, &[10]);
        assert!(board.finish_game(false).finished.is_none());
        assert!(board.finish_game(true).finished.is_none());
        assert!(board.history().is_empty());
        assert!(board.session().rounds().is_empty());
    }

    #[test]
    fn finish_clears_winner_and_history_can_be_cleared() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A"]);
        play_round(&mut board, &ids, &[1000]);
        let applied = board.finish_game(true);
        assert_eq!(applied.winner, WinnerChange::Cleared);
        assert_eq!(board.session().winner(), None);

        board.apply(Intent::ClearHistory).unwrap();
        assert!(board.history().is_empty());
    }

    #[test]
    fn suggested_color_skips_colors_in_use() {
        let mut board = Scoreboard::new(ScoringConfig::default());
        assert_eq!(board.suggested_color(), Some(PlayerColor::Red));
        board.add_player("A", PlayerColor::Red, None).unwrap();
        assert_eq!(board.suggested_color(), Some(PlayerColor::Blue));
    }

    #[test]
    fn photo_can_be_set_and_removed() {
        let (mut board, ids) = board_with(ScoringConfig::default(), &["A"]);
        let photo = PhotoRef::new("/tmp/ana.png");
        board
            .apply(Intent::SetPlayerPhoto {
                player_id: ids[0],
                photo: Some(photo.clone()),
            })
            .unwrap();
        assert_eq!(board.session().player(ids[0]).unwrap().photo, Some(photo));
        board.set_player_photo(ids[0], None).unwrap();
        assert_eq!(board.session().player(ids[0]).unwrap().photo, None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn rounds_strategy() -> impl Strategy<Value = (usize, Vec<Vec<i64>>)> {
            (1usize..6).prop_flat_map(|players| {
                (
                    Just(players),
                    proptest::collection::vec(
                        proptest::collection::vec(-500i64..=500, players),
                        0..12,
                    ),
                )
            })
        }

        fn names(count: usize) -> Vec<String> {
            (0..count).map(|i| format!("P{i}")).collect()
        }

        fn setup(count: usize) -> (Scoreboard, Vec<PlayerId>) {
            let names = names(count);
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            board_with(ScoringConfig::default(), &refs)
        }

        proptest! {
            #[test]
            fn totals_are_column_sums((count, rounds) in rounds_strategy()) {
                let (mut board, ids) = setup(count);
                for scores in &rounds {
                    play_round(&mut board, &ids, scores);
                }
                for (i, (_, total)) in board.compute_totals().into_iter().enumerate() {
                    let expected: i64 = rounds.iter().map(|r| r[i]).sum();
                    prop_assert_eq!(total, expected);
                }
            }

            #[test]
            fn undo_then_submit_round_trips((count, rounds) in rounds_strategy()) {
                prop_assume!(!rounds.is_empty());
                let (mut board, ids) = setup(count);
                for scores in &rounds {
                    play_round(&mut board, &ids, scores);
                }
                let before = board.session().rounds().to_vec();
                board.undo_last_round().unwrap();
                board.submit_round().unwrap();
                prop_assert_eq!(board.session().rounds(), before.as_slice());
            }

            #[test]
            fn delete_leaves_other_totals_alone(
                (count, rounds) in rounds_strategy(),
                pick in any::<prop::sample::Index>(),
                typed in -500i64..=500,
            ) {
                let (mut board, ids) = setup(count);
                for scores in &rounds {
                    play_round(&mut board, &ids, scores);
                }
                let victim = ids[pick.index(ids.len())];
                board.set_in_progress_score(victim, &typed.to_string()).unwrap();
                if let Some(other) = ids.iter().find(|id| **id != victim) {
                    board.set_in_progress_score(*other, "7").unwrap();
                }

                let before: Vec<(PlayerId, i64)> = board
                    .compute_totals()
                    .into_iter()
                    .filter(|(id, _)| *id != victim)
                    .collect();
                let sizes: Vec<usize> = board
                    .session()
                    .rounds()
                    .iter()
                    .map(|round| round.scores.len())
                    .collect();
                let pending_before = board.session.pending.clone();

                board.delete_player(victim).unwrap();
                prop_assert_eq!(board.compute_totals(), before);
                for (round, size) in board.session().rounds().iter().zip(sizes) {
                    prop_assert_eq!(round.scores.len(), size - 1);
                }
                prop_assert_eq!(board.session.pending.len(), pending_before.len() - 1);
                prop_assert!(!board.session.pending.contains_key(&victim));
                for id in ids.iter().filter(|id| **id != victim) {
                    prop_assert_eq!(
                        board.session().pending_text(*id),
                        pending_before[id].as_str()
                    );
                }
            }

            #[test]
            fn cut_zeroes_only_the_target(
                (count, rounds) in rounds_strategy(),
                pick in any::<prop::sample::Index>(),
            ) {
                let (mut board, ids) = setup(count);
                for scores in &rounds {
                    play_round(&mut board, &ids, scores);
                }
                let target = ids[pick.index(ids.len())];
                let before = board.compute_totals();

                board.cut_player_score(target).unwrap();
                for ((id, old), (_, new)) in before.into_iter().zip(board.compute_totals()) {
                    if id == target {
                        prop_assert_eq!(new, 0);
                    } else {
                        prop_assert_eq!(new, old);
                    }
                }
            }
        }
    }
}
