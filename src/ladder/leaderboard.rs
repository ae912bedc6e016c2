//! Leaderboard ordering and presentation helpers

use crate::types::{display_rating, LeaderboardEntry, PlayerId, PlayerRecord};
use std::cmp::Ordering;

/// Rank players by rating, highest first
///
/// The sort is stable, so players with equal ratings keep the order they
/// were stored in.
pub fn build_leaderboard(mut records: Vec<(PlayerId, PlayerRecord)>) -> Vec<LeaderboardEntry> {
    // `-0.0` and `0.0` are the same rating and must stay in stored order.
    records.sort_by(|a, b| {
        b.1.rating
            .partial_cmp(&a.1.rating)
            .unwrap_or(Ordering::Equal)
    });

    records
        .into_iter()
        .enumerate()
        .map(|(index, (player_id, record))| LeaderboardEntry {
            rank: index + 1,
            display_rating: display_rating(record.rating),
            win_percentage: record.win_percentage(),
            rating: record.rating,
            wins: record.wins,
            losses: record.losses,
            player_id,
        })
        .collect()
}

/// English ordinal for a rank: 1st, 2nd, 3rd, 4th, 11th, 21st, ...
pub fn ordinal(rank: usize) -> String {
    let suffix = match (rank % 10, rank % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", rank, suffix)
}

/// Placement label with a medal for the podium
pub fn placement_label(rank: usize) -> String {
    match rank {
        1 => format!("🥇 {}", ordinal(rank)),
        2 => format!("🥈 {}", ordinal(rank)),
        3 => format!("🥉 {}", ordinal(rank)),
        _ => ordinal(rank),
    }
}
