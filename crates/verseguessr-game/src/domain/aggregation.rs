//! Combining round scores into a session score.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use verseguessr_core::error::GameError;

/// How finalized round scores combine into the session score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreAggregation {
    /// Best single round.
    #[default]
    Maximum,
    /// Total over all rounds.
    Sum,
}

impl ScoreAggregation {
    /// Combines `scores`. An empty set scores zero under either policy.
    #[must_use]
    pub fn aggregate<I>(self, scores: I) -> u32
    where
        I: IntoIterator<Item = u32>,
    {
        let scores = scores.into_iter();
        match self {
            Self::Maximum => scores.max().unwrap_or(0),
            Self::Sum => scores.fold(0, u32::saturating_add),
        }
    }
}

impl FromStr for ScoreAggregation {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" | "maximum" => Ok(Self::Maximum),
            "sum" => Ok(Self::Sum),
            other => Err(GameError::Validation(format!(
                "unknown score aggregation {other:?}, expected \"max\" or \"sum\""
            ))),
        }
    }
}
