//! Rating system: the ELO calculator and the player record store
//!
//! This module provides rating calculations and storage interfaces
//! for two-player matches.

pub mod calculator;
pub mod elo;
pub mod storage;

// Re-export commonly used types
pub use calculator::RatingCalculator;
pub use elo::{EloConfig, EloRatingCalculator};
pub use storage::{InMemoryRatingStorage, JsonFileRatingStorage, RatingBook, RatingStorage};
