//! Per-round scoring.
//!
//! A round's score depends only on its hint level and guess count and never
//! increases when either grows. The concrete formula is a swappable policy.

use std::fmt::Debug;

use super::segment::HintLevel;

/// Scores a single round.
pub trait ScoringPolicy: Send + Sync + Debug {
    /// Short policy name for logs.
    fn name(&self) -> &'static str;

    /// Score for a round with `hint_level` hints and `guess_count` guesses.
    ///
    /// Must be deterministic and non-increasing in both arguments.
    fn score(&self, hint_level: HintLevel, guess_count: usize) -> u32;
}

/// Starts at `max_score` and subtracts a fixed penalty per hint and per
/// guess after the first, floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPenaltyScoring {
    /// Score of a first-guess round without hints.
    pub max_score: u32,
    /// Deducted per hint level.
    pub hint_penalty: u32,
    /// Deducted per guess beyond the first.
    pub guess_penalty: u32,
}

impl Default for StepPenaltyScoring {
    fn default() -> Self {
        Self {
            max_score: 5000,
            hint_penalty: 1000,
            guess_penalty: 250,
        }
    }
}

impl ScoringPolicy for StepPenaltyScoring {
    fn name(&self) -> &'static str {
        "step_penalty"
    }

    fn score(&self, hint_level: HintLevel, guess_count: usize) -> u32 {
        let extra_guesses = u32::try_from(guess_count.saturating_sub(1)).unwrap_or(u32::MAX);
        let penalty = self
            .hint_penalty
            .saturating_mul(u32::from(hint_level.get()))
            .saturating_add(self.guess_penalty.saturating_mul(extra_guesses));
        self.max_score.saturating_sub(penalty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_guess_without_hints_scores_maximum() {
        let policy = StepPenaltyScoring::default();

        assert_eq!(policy.score(HintLevel::NONE, 1), 5000);
        assert_eq!(policy.score(HintLevel::NONE, 0), 5000);
    }

    #[test]
    fn test_penalties_accumulate() {
        let policy = StepPenaltyScoring::default();

        assert_eq!(policy.score(HintLevel::new(2), 3), 5000 - 2000 - 500);
    }

    #[test]
    fn test_score_floors_at_zero() {
        let policy = StepPenaltyScoring::default();

        assert_eq!(policy.score(HintLevel::MAX, 1000), 0);
    }

    #[test]
    fn test_score_is_non_increasing_in_hints_and_guesses() {
        let policy = StepPenaltyScoring::default();
        for level in 0..=3u8 {
            for guesses in 0..30usize {
                let here = policy.score(HintLevel::new(level), guesses);
                assert!(policy.score(HintLevel::new(level), guesses + 1) <= here);
                if level < 3 {
                    assert!(policy.score(HintLevel::new(level + 1), guesses) <= here);
                }
            }
        }
    }
}
