//! Reply text shown to whoever issued a ladder command

use crate::ladder::leaderboard::placement_label;
use crate::types::{
    AddPlayerOutcome, LeaderboardEntry, MatchReport, PlayerRecord, RemovePlayerOutcome,
};

pub fn match_reply(report: &MatchReport) -> String {
    format!(
        "ELO ratings updated! {} vs. {}. New ELO's are: {}: {}, {}: {}.",
        report.player1,
        report.player2,
        report.player1,
        report.display_rating1,
        report.player2,
        report.display_rating2
    )
}

/// Leaderboard listing, one three-line block per player
pub fn leaderboard_reply(entries: &[LeaderboardEntry]) -> String {
    let mut lines = vec!["ELO Leaderboard".to_string()];
    for entry in entries {
        lines.push(placement_label(entry.rank));
        lines.push(format!("  {} (ELO: {})", entry.player_id, entry.display_rating));
        lines.push(format!(
            "  Wins: {}, Losses: {}, Win%: {:.2}%",
            entry.wins, entry.losses, entry.win_percentage
        ));
    }
    lines.join("\n")
}

/// The existing-player case reports the raw stored rating
pub fn add_player_reply(player_id: &str, outcome: &AddPlayerOutcome) -> String {
    match outcome {
        AddPlayerOutcome::Added { rating } => {
            format!("Player {} added with default ELO of {}.", player_id, rating)
        }
        AddPlayerOutcome::AlreadyExists { rating } => {
            format!("Player {} already exists with an ELO of {}.", player_id, rating)
        }
    }
}

pub fn remove_player_reply(player_id: &str, outcome: &RemovePlayerOutcome) -> String {
    match outcome {
        RemovePlayerOutcome::Removed => {
            format!("Player {} has been removed from the ELO system.", player_id)
        }
        RemovePlayerOutcome::NotFound => not_found_reply(player_id),
    }
}

pub fn show_reply(player_id: &str, record: Option<&PlayerRecord>) -> String {
    match record {
        Some(record) => format!(
            "{} (ELO: {}) Wins: {}, Losses: {}, Win%: {:.2}%",
            player_id,
            record.display_rating(),
            record.wins,
            record.losses,
            record.win_percentage()
        ),
        None => not_found_reply(player_id),
    }
}

fn not_found_reply(player_id: &str) -> String {
    format!("Player {} does not exist in the ELO system.", player_id)
}
