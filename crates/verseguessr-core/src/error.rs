//! Domain error types.

use thiserror::Error;

/// Top-level error type for the game session engine.
#[derive(Debug, Error)]
pub enum GameError {
    /// Input rejected by catalog bounds or settings limits.
    #[error("validation error: {0}")]
    Validation(String),

    /// An operation was invoked in a state that does not permit it.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The verse service or guess counter could not be reached.
    #[error("service error: {0}")]
    Service(String),

    /// A service response could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_error_converts_to_parse() {
        let err: GameError = serde_json::from_str::<u32>("not a number")
            .unwrap_err()
            .into();
        assert!(matches!(err, GameError::Parse(_)));
    }

    #[test]
    fn test_display_includes_category_prefix() {
        let err = GameError::Validation("chapter 0 out of range".into());
        assert_eq!(err.to_string(), "validation error: chapter 0 out of range");
    }
}
