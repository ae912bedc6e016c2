//! ELO Ladder - persistent two-player skill ratings
//!
//! This crate records match results between two players, updates their
//! ratings with a margin-weighted ELO formula, keeps every record in a JSON
//! document on disk, and produces a leaderboard.

pub mod config;
pub mod error;
pub mod ladder;
pub mod rating;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LadderError, Result};
pub use types::*;

// Re-export key components
pub use ladder::LadderManager;
pub use rating::{EloRatingCalculator, JsonFileRatingStorage, RatingCalculator, RatingStorage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
