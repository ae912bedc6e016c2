//! Ladder manager implementation
//!
//! This module provides the LadderManager that records matches, adds and
//! removes players, and produces the leaderboard. Every read-modify-persist
//! sequence runs under a single lock so concurrent reports cannot overwrite
//! each other.

use crate::error::{LadderError, Result};
use crate::ladder::leaderboard::build_leaderboard;
use crate::rating::calculator::RatingCalculator;
use crate::rating::elo::EloRatingCalculator;
use crate::rating::storage::RatingStorage;
use crate::types::{
    AddPlayerOutcome, LeaderboardEntry, MatchReport, PlayerRecord, RemovePlayerOutcome, Winner,
};
use crate::utils::current_timestamp;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// The main ladder manager
#[derive(Clone)]
pub struct LadderManager {
    /// Player record store
    storage: Arc<dyn RatingStorage>,
    /// Rating calculator applied to every match
    rating_calculator: Arc<dyn RatingCalculator>,
    /// Serializes mutating operations
    write_lock: Arc<Mutex<()>>,
}

impl LadderManager {
    /// Create a new ladder manager with the default ELO calculator
    pub fn new(storage: Arc<dyn RatingStorage>) -> Self {
        Self::with_calculator(storage, Arc::new(EloRatingCalculator::default()))
    }

    /// Create with a custom rating calculator
    pub fn with_calculator(
        storage: Arc<dyn RatingStorage>,
        rating_calculator: Arc<dyn RatingCalculator>,
    ) -> Self {
        Self {
            storage,
            rating_calculator,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Record the result of a match and update both players
    ///
    /// Players that have never been seen start from the default record.
    /// Both records are written in one persisted batch.
    pub async fn record_match(
        &self,
        player1: &str,
        player2: &str,
        score1: u32,
        score2: u32,
    ) -> Result<MatchReport> {
        if score1 == score2 {
            warn!(
                "Rejected tied match report - {} vs {} ({}-{})",
                player1, player2, score1, score2
            );
            return Err(LadderError::InvalidMatchInput {
                reason: format!("scores are tied at {}", score1),
            }
            .into());
        }
        if player1 == player2 {
            warn!("Rejected match report - '{}' cannot play themselves", player1);
            return Err(LadderError::InvalidMatchInput {
                reason: format!("player '{}' appears on both sides", player1),
            }
            .into());
        }

        let _guard = self.write_lock.lock().await;

        let calculator = Arc::clone(&self.rating_calculator);
        let (id1, id2) = (player1.to_string(), player2.to_string());
        let (record1, record2, result) = self
            .with_storage(move |storage| {
                let mut record1 = storage.get_or_default(&id1)?;
                let mut record2 = storage.get_or_default(&id2)?;

                let result = calculator.compute_match_result(
                    record1.rating,
                    record2.rating,
                    score1,
                    score2,
                )?;

                record1.rating = result.new_rating1;
                record2.rating = result.new_rating2;
                match result.winner {
                    Winner::Player1 => {
                        record1.wins += 1;
                        record2.losses += 1;
                    }
                    Winner::Player2 => {
                        record2.wins += 1;
                        record1.losses += 1;
                    }
                }

                storage.upsert_many(vec![(id1, record1.clone()), (id2, record2.clone())])?;
                Ok((record1, record2, result))
            })
            .await?;

        let winner = match result.winner {
            Winner::Player1 => player1,
            Winner::Player2 => player2,
        };

        info!(
            "Match recorded - {} vs {} ({}-{}), winner: '{}', change: {:.2}, new ratings: {:.2} / {:.2}",
            player1,
            player2,
            score1,
            score2,
            winner,
            result.rating_change,
            record1.rating,
            record2.rating
        );

        Ok(MatchReport {
            player1: player1.to_string(),
            player2: player2.to_string(),
            score1,
            score2,
            display_rating1: record1.display_rating(),
            display_rating2: record2.display_rating(),
            record1,
            record2,
            winner: winner.to_string(),
            rating_change: result.rating_change,
            recorded_at: current_timestamp(),
        })
    }

    /// Add a player with the default record unless they already exist
    pub async fn add_player(&self, player_id: &str) -> Result<AddPlayerOutcome> {
        let _guard = self.write_lock.lock().await;

        let id = player_id.to_string();
        let outcome = self
            .with_storage(move |storage| {
                if let Some(existing) = storage.get(&id)? {
                    return Ok(AddPlayerOutcome::AlreadyExists {
                        rating: existing.rating,
                    });
                }

                let record = storage.default_record();
                let rating = record.rating;
                storage.upsert(&id, record)?;
                Ok(AddPlayerOutcome::Added { rating })
            })
            .await?;

        match &outcome {
            AddPlayerOutcome::Added { rating } => {
                info!("Player '{}' added with rating {:.2}", player_id, rating)
            }
            AddPlayerOutcome::AlreadyExists { rating } => debug!(
                "Player '{}' already exists with rating {:.2}",
                player_id, rating
            ),
        }
        Ok(outcome)
    }

    /// Remove a player and their record
    pub async fn remove_player(&self, player_id: &str) -> Result<RemovePlayerOutcome> {
        let _guard = self.write_lock.lock().await;

        let id = player_id.to_string();
        if self.with_storage(move |storage| storage.remove(&id)).await? {
            info!("Player '{}' removed from the ladder", player_id);
            Ok(RemovePlayerOutcome::Removed)
        } else {
            debug!("Player '{}' not found, nothing removed", player_id);
            Ok(RemovePlayerOutcome::NotFound)
        }
    }

    /// Current standings, highest rating first
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        let records = self.with_storage(|storage| storage.list()).await?;
        Ok(build_leaderboard(records))
    }

    /// Look up a stored player without creating them
    pub async fn player_record(&self, player_id: &str) -> Result<Option<PlayerRecord>> {
        let id = player_id.to_string();
        self.with_storage(move |storage| storage.get(&id)).await
    }

    /// Run a storage operation on the blocking pool
    ///
    /// File-backed stores do synchronous disk I/O, which must stay off the
    /// async worker threads.
    async fn with_storage<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&dyn RatingStorage) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || operation(storage.as_ref()))
            .await
            .map_err(|e| LadderError::Internal {
                message: format!("storage task failed: {}", e),
            })?
    }

    /// Get the rating calculator's configuration
    pub fn calculator_config(&self) -> serde_json::Value {
        self.rating_calculator.config()
    }
}
