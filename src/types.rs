//! Common types used throughout the rating ladder

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier for a player, kept exactly as the caller supplied it
pub type PlayerId = String;

/// Rating every player starts from
pub const INITIAL_RATING: f64 = 5000.0;

/// Rating record for a single player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub rating: f64,
    pub wins: u64,
    pub losses: u64,
}

impl PlayerRecord {
    /// Create a record with the given rating and no games played
    pub fn new(rating: f64) -> Self {
        Self {
            rating,
            wins: 0,
            losses: 0,
        }
    }

    pub fn games_played(&self) -> u64 {
        self.wins + self.losses
    }

    /// Share of games won, in percent. Zero when no games have been played.
    pub fn win_percentage(&self) -> f64 {
        let total = self.games_played();
        if total == 0 {
            return 0.0;
        }
        self.wins as f64 / total as f64 * 100.0
    }

    /// Rating as shown to players, rounded up
    pub fn display_rating(&self) -> i64 {
        display_rating(self.rating)
    }
}

impl Default for PlayerRecord {
    fn default() -> Self {
        Self::new(INITIAL_RATING)
    }
}

/// Round a raw rating up to the integer shown to players
pub fn display_rating(rating: f64) -> i64 {
    rating.ceil() as i64
}

/// Which side of a match won
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    Player1,
    Player2,
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Winner::Player1 => write!(f, "Player1"),
            Winner::Player2 => write!(f, "Player2"),
        }
    }
}

/// Output of a single rating calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub new_rating1: f64,
    pub new_rating2: f64,
    pub winner: Winner,
    /// Amount taken from the loser (the winner also receives the incentive)
    pub rating_change: f64,
}

/// Summary of a recorded match, returned to the command layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub player1: PlayerId,
    pub player2: PlayerId,
    pub score1: u32,
    pub score2: u32,
    pub record1: PlayerRecord,
    pub record2: PlayerRecord,
    pub display_rating1: i64,
    pub display_rating2: i64,
    pub winner: PlayerId,
    pub rating_change: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Outcome of adding a player to the ladder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AddPlayerOutcome {
    Added { rating: f64 },
    AlreadyExists { rating: f64 },
}

impl AddPlayerOutcome {
    pub fn rating(&self) -> f64 {
        match self {
            AddPlayerOutcome::Added { rating } | AddPlayerOutcome::AlreadyExists { rating } => {
                *rating
            }
        }
    }

    pub fn already_existed(&self) -> bool {
        matches!(self, AddPlayerOutcome::AlreadyExists { .. })
    }
}

/// Outcome of removing a player from the ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovePlayerOutcome {
    Removed,
    NotFound,
}

/// One row of the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position
    pub rank: usize,
    pub player_id: PlayerId,
    pub rating: f64,
    pub display_rating: i64,
    pub wins: u64,
    pub losses: u64,
    pub win_percentage: f64,
}
