//! Margin-weighted ELO rating system
//!
//! Ratings move by an amount that grows with the score margin and with the
//! size of the upset. Favourites that win close to the expected gap gain
//! little; underdogs that win gain more the larger the gap they overcame.
//! Every winner also receives a small fixed incentive, so rating mass is not
//! conserved.

use crate::error::LadderError;
use crate::rating::calculator::RatingCalculator;
use crate::types::{MatchResult, Winner};
use crate::utils::rating_difference;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the ELO rating system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EloConfig {
    /// Exponent applied to the score margin
    pub win_exponent: f64,
    /// Margin factor for a zero-margin result
    pub win_base: f64,
    /// Weight of the exponentiated margin
    pub win_scale: f64,
    /// Rating gap around which expected wins stop paying out
    pub upset_threshold: f64,
    /// Scales the combined factor into rating points
    pub change_constant: f64,
    /// `change_constant / incentive_divisor` is added to every winner
    pub incentive_divisor: f64,
    /// Rating change applied even when the rating factor is zero
    pub minimum_change: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            win_exponent: 1.489896102405,
            win_base: 0.9,
            win_scale: 0.1,
            upset_threshold: 500.0,
            change_constant: 0.192,
            incentive_divisor: 78.125,
            minimum_change: 1.0,
        }
    }
}

impl EloConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        let finite = [
            ("Win exponent", self.win_exponent),
            ("Win base", self.win_base),
            ("Win scale", self.win_scale),
            ("Upset threshold", self.upset_threshold),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(LadderError::Configuration {
                    message: format!("{} must be a finite number", name),
                }
                .into());
            }
        }

        if self.upset_threshold < 0.0 {
            return Err(LadderError::Configuration {
                message: "Upset threshold must be non-negative".to_string(),
            }
            .into());
        }

        if self.change_constant <= 0.0 || !self.change_constant.is_finite() {
            return Err(LadderError::Configuration {
                message: "Change constant must be positive".to_string(),
            }
            .into());
        }

        if self.incentive_divisor <= 0.0 || !self.incentive_divisor.is_finite() {
            return Err(LadderError::Configuration {
                message: "Incentive divisor must be positive".to_string(),
            }
            .into());
        }

        if self.minimum_change <= 0.0 || !self.minimum_change.is_finite() {
            return Err(LadderError::Configuration {
                message: "Minimum change must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// ELO rating calculator
#[derive(Debug, Clone, Default)]
pub struct EloRatingCalculator {
    config: EloConfig,
}

impl EloRatingCalculator {
    /// Create a new calculator, rejecting invalid configuration
    pub fn new(config: EloConfig) -> crate::error::Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    /// Bonus added to every winner on top of the rating change
    pub fn incentive(&self) -> f64 {
        self.config.change_constant / self.config.incentive_divisor
    }

    /// Multiplier derived from the score margin
    pub fn win_factor(&self, delta_wins: i64) -> f64 {
        let margin = delta_wins.unsigned_abs() as f64;
        self.config.win_base + margin.powf(self.config.win_exponent) * self.config.win_scale
    }

    /// Rating points that move from loser to winner
    ///
    /// `delta_wins` is `score1 - score2`; its sign says who won.
    pub fn rating_change(&self, rating1: f64, rating2: f64, delta_wins: i64) -> f64 {
        let gap = rating_difference(rating1, rating2);
        let threshold = self.config.upset_threshold;

        // Favourite won: shrink towards zero as the gap approaches the threshold.
        let elo_factor = if (rating1 - rating2) * delta_wins as f64 > 0.0 {
            (threshold - gap).abs()
        } else {
            gap + threshold
        };

        self.win_factor(delta_wins) * elo_factor.max(0.0) * self.config.change_constant
            + self.config.minimum_change
    }
}

impl RatingCalculator for EloRatingCalculator {
    fn compute_match_result(
        &self,
        rating1: f64,
        rating2: f64,
        score1: u32,
        score2: u32,
    ) -> crate::error::Result<MatchResult> {
        if score1 == score2 {
            return Err(LadderError::InvalidMatchInput {
                reason: format!("scores are tied at {}", score1),
            }
            .into());
        }

        let delta_wins = i64::from(score1) - i64::from(score2);
        let change = self.rating_change(rating1, rating2, delta_wins);
        let incentive = self.incentive();

        let result = if score1 > score2 {
            MatchResult {
                new_rating1: rating1 + incentive + change,
                new_rating2: rating2 - change,
                winner: Winner::Player1,
                rating_change: change,
            }
        } else {
            MatchResult {
                new_rating1: rating1 - change,
                new_rating2: rating2 + incentive + change,
                winner: Winner::Player2,
                rating_change: change,
            }
        };

        debug!(
            "Computed match result: {:.2} vs {:.2} ({}-{}) -> {:.2} / {:.2}, change {:.2}",
            rating1, rating2, score1, score2, result.new_rating1, result.new_rating2, change
        );

        Ok(result)
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn calculator() -> EloRatingCalculator {
        EloRatingCalculator::new(EloConfig::default()).unwrap()
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(EloConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EloConfig {
            change_constant: 0.0,
            ..EloConfig::default()
        };
        assert!(EloRatingCalculator::new(config).is_err());

        let config = EloConfig {
            incentive_divisor: -1.0,
            ..EloConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EloConfig {
            upset_threshold: -500.0,
            ..EloConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EloConfig {
            win_exponent: f64::NAN,
            ..EloConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_incentive_constant() {
        let calc = calculator();
        assert!(approx_eq(calc.incentive(), 0.192 / 78.125));
        assert!((calc.incentive() - 0.0024576).abs() < 1e-12);
    }

    #[test]
    fn test_equal_ratings_two_nil() {
        let calc = calculator();
        let result = calc.compute_match_result(5000.0, 5000.0, 2, 0).unwrap();

        assert_eq!(result.winner, Winner::Player1);
        assert!((result.rating_change - 114.36).abs() < 0.01);
        assert!((result.new_rating1 - 5114.36).abs() < 0.01);
        assert!((result.new_rating2 - 4885.64).abs() < 0.01);
    }

    #[test]
    fn test_player2_wins_symmetrically() {
        let calc = calculator();
        let forward = calc.compute_match_result(5000.0, 5000.0, 2, 0).unwrap();
        let reverse = calc.compute_match_result(5000.0, 5000.0, 0, 2).unwrap();

        assert_eq!(reverse.winner, Winner::Player2);
        assert!(approx_eq(forward.new_rating1, reverse.new_rating2));
        assert!(approx_eq(forward.new_rating2, reverse.new_rating1));
    }

    #[test]
    fn test_tie_is_rejected() {
        let calc = calculator();
        let err = calc.compute_match_result(5000.0, 4000.0, 3, 3).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LadderError>(),
            Some(LadderError::InvalidMatchInput { .. })
        ));
    }

    #[test]
    fn test_favourite_gains_less_than_underdog() {
        let calc = calculator();
        // 5300 beats 5000: expected result
        let expected = calc.compute_match_result(5300.0, 5000.0, 1, 0).unwrap();
        // 5000 beats 5300: upset
        let upset = calc.compute_match_result(5000.0, 5300.0, 1, 0).unwrap();

        assert!(upset.rating_change > expected.rating_change);
        // win factor for a margin of one is exactly 1.0
        assert!(approx_eq(expected.rating_change, 200.0 * 0.192 + 1.0));
        assert!(approx_eq(upset.rating_change, 800.0 * 0.192 + 1.0));
    }

    #[test]
    fn test_gap_at_threshold_gives_minimum_change() {
        let calc = calculator();
        let result = calc.compute_match_result(5500.0, 5000.0, 1, 0).unwrap();
        assert!(approx_eq(result.rating_change, 1.0));
        assert!(approx_eq(result.new_rating1, 5501.0 + calc.incentive()));
        assert!(approx_eq(result.new_rating2, 4999.0));
    }

    #[test]
    fn test_gap_beyond_threshold_grows_again() {
        let calc = calculator();
        let at_threshold = calc.rating_change(5500.0, 5000.0, 1);
        let beyond = calc.rating_change(6000.0, 5000.0, 1);
        assert!(beyond > at_threshold);
        assert!(approx_eq(beyond, 500.0 * 0.192 + 1.0));
    }

    #[test]
    fn test_larger_margin_amplifies_change() {
        let calc = calculator();
        let narrow = calc.rating_change(5000.0, 5000.0, 1);
        let wide = calc.rating_change(5000.0, 5000.0, 5);
        assert!(wide > narrow);
        assert!(approx_eq(calc.win_factor(1), 1.0));
        assert!(approx_eq(calc.win_factor(-1), 1.0));
        assert!(approx_eq(calc.win_factor(0), 0.9));
    }

    #[test]
    fn test_negative_ratings_are_allowed() {
        let calc = calculator();
        let result = calc.compute_match_result(-200.0, 100.0, 0, 3).unwrap();
        assert_eq!(result.winner, Winner::Player2);
        assert!(result.new_rating1 < -200.0);
        assert!(result.new_rating2 > 100.0);
    }

    #[test]
    fn test_config_reports_constants() {
        let calc = EloRatingCalculator::new(EloConfig {
            upset_threshold: 400.0,
            ..EloConfig::default()
        })
        .unwrap();
        assert_eq!(calc.config()["upset_threshold"], 400.0);
        assert_eq!(calc.config()["change_constant"], 0.192);
    }

    proptest! {
        #[test]
        fn prop_winner_gains_and_loser_drops(
            rating1 in -100_000.0f64..100_000.0,
            rating2 in -100_000.0f64..100_000.0,
            score1 in 0u32..50,
            score2 in 0u32..50,
        ) {
            prop_assume!(score1 != score2);
            let result = calculator().compute_match_result(rating1, rating2, score1, score2).unwrap();

            prop_assert!(result.rating_change >= 1.0);
            if score1 > score2 {
                prop_assert_eq!(result.winner, Winner::Player1);
                prop_assert!(result.new_rating1 > rating1);
                prop_assert!(result.new_rating2 < rating2);
            } else {
                prop_assert_eq!(result.winner, Winner::Player2);
                prop_assert!(result.new_rating2 > rating2);
                prop_assert!(result.new_rating1 < rating1);
            }
        }

        #[test]
        fn prop_incentive_is_the_only_mass_injected(
            rating1 in -100_000.0f64..100_000.0,
            rating2 in -100_000.0f64..100_000.0,
            score1 in 0u32..50,
            score2 in 0u32..50,
        ) {
            prop_assume!(score1 != score2);
            let calc = calculator();
            let result = calc.compute_match_result(rating1, rating2, score1, score2).unwrap();

            let before = rating1 + rating2 + calc.incentive();
            let after = result.new_rating1 + result.new_rating2;
            prop_assert!((before - after).abs() <= 1e-6 * before.abs().max(1.0));
        }

        #[test]
        fn prop_deterministic(
            rating1 in -100_000.0f64..100_000.0,
            rating2 in -100_000.0f64..100_000.0,
            score1 in 0u32..50,
            score2 in 0u32..50,
        ) {
            prop_assume!(score1 != score2);
            let calc = calculator();
            let first = calc.compute_match_result(rating1, rating2, score1, score2).unwrap();
            let second = calc.compute_match_result(rating1, rating2, score1, score2).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
