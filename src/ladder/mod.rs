//! Ladder management: the operations the command layer calls
//!
//! This module ties the rating calculator to the record store and
//! builds the leaderboard and the reply text.

pub mod leaderboard;
pub mod manager;
pub mod render;

// Re-export commonly used types
pub use leaderboard::{build_leaderboard, ordinal, placement_label};
pub use manager::LadderManager;
