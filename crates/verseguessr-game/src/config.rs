//! Game configuration.

use serde::{Deserialize, Serialize};
use verseguessr_core::error::GameError;

use crate::domain::aggregation::ScoreAggregation;
use crate::domain::segment::{MAX_CONTEXT_RADIUS, SegmentSettings};

/// Environment variable for [`GameConfig::default_version`].
pub const ENV_DEFAULT_VERSION: &str = "VERSEGUESSR_DEFAULT_VERSION";
/// Environment variable for [`GameConfig::default_context_radius`].
pub const ENV_CONTEXT_RADIUS: &str = "VERSEGUESSR_CONTEXT_RADIUS";
/// Environment variable for [`GameConfig::score_aggregation`].
pub const ENV_SCORE_AGGREGATION: &str = "VERSEGUESSR_SCORE_AGGREGATION";

/// Session defaults and policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Version preselected for new rounds and after a reset.
    pub default_version: String,
    /// Context radius preselected for new rounds and after a reset.
    pub default_context_radius: u32,
    /// How finalized round scores combine.
    pub score_aggregation: ScoreAggregation,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            default_version: "King James Bible".to_owned(),
            default_context_radius: 5,
            score_aggregation: ScoreAggregation::Maximum,
        }
    }
}

impl GameConfig {
    /// Reads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Validation` if a variable is set but unparsable,
    /// or the result fails [`Self::validate`].
    pub fn from_env() -> Result<Self, GameError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`] with a custom variable source.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GameError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(version) = lookup(ENV_DEFAULT_VERSION) {
            config.default_version = version;
        }
        if let Some(radius) = lookup(ENV_CONTEXT_RADIUS) {
            config.default_context_radius = radius.trim().parse().map_err(|e| {
                GameError::Validation(format!("{ENV_CONTEXT_RADIUS} must be a valid u32: {e}"))
            })?;
        }
        if let Some(policy) = lookup(ENV_SCORE_AGGREGATION) {
            config.score_aggregation = policy.parse()?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks internal consistency.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Validation` for an empty default version or a
    /// default radius above the service limit.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.default_version.trim().is_empty() {
            return Err(GameError::Validation(
                "default_version must not be empty".to_owned(),
            ));
        }
        if self.default_context_radius > MAX_CONTEXT_RADIUS {
            return Err(GameError::Validation(format!(
                "default_context_radius {} exceeds {MAX_CONTEXT_RADIUS}",
                self.default_context_radius
            )));
        }
        Ok(())
    }

    /// Settings for a freshly created round.
    #[must_use]
    pub fn default_segment_settings(&self) -> SegmentSettings {
        SegmentSettings {
            version: self.default_version.clone(),
            context_radius: self.default_context_radius,
        }
    }
}
