//! Rating calculator trait
//!
//! This module defines the interface the ladder uses to turn a match score
//! into new ratings.

use crate::types::MatchResult;

/// Trait for calculating rating changes after a two-player match
pub trait RatingCalculator: Send + Sync {
    /// Calculate new ratings for both players from a final score
    ///
    /// # Arguments
    /// * `rating1`, `rating2` - Current ratings of player 1 and player 2
    /// * `score1`, `score2` - Games won by each player in the match
    ///
    /// # Returns
    /// The new ratings and the winning side. Tied scores are rejected
    /// with `LadderError::InvalidMatchInput`.
    fn compute_match_result(
        &self,
        rating1: f64,
        rating2: f64,
        score1: u32,
        score2: u32,
    ) -> crate::error::Result<MatchResult>;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}
