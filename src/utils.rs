//! Utility functions for the rating ladder

use chrono::{DateTime, Utc};

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Calculate the absolute difference between two ratings
pub fn rating_difference(rating1: f64, rating2: f64) -> f64 {
    (rating1 - rating2).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_advance() {
        let first = current_timestamp();
        let second = current_timestamp();
        assert!(second >= first);
    }

    #[test]
    fn test_rating_difference() {
        assert_eq!(rating_difference(5500.0, 5000.0), 500.0);
        assert_eq!(rating_difference(5000.0, 5500.0), 500.0);
        assert_eq!(rating_difference(5000.0, 5000.0), 0.0);
    }
}
