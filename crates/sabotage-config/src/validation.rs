//! Configuration validation

use crate::schema::{RawConfig, RawGameConfig, RawServerConfig};
use crate::MIN_PLAYERS;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.port must not be 0")]
    ZeroPort,

    #[error("server.allowed_origin must not be empty")]
    EmptyOrigin,

    #[error("game.max_players is {0}, must be at least {min}", min = MIN_PLAYERS)]
    TooFewPlayers(usize),

    #[error("game.chore_win_threshold must be at least 1")]
    ZeroChoreThreshold,

    #[error("game.{0} must be greater than 0")]
    ZeroDuration(&'static str),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = validate_server(&config.server);
    errors.extend(validate_game(&config.game));
    errors
}

fn validate_server(server: &RawServerConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if server.port == Some(0) {
        errors.push(ValidationError::ZeroPort);
    }

    if let Some(origin) = &server.allowed_origin
        && origin.trim().is_empty()
    {
        errors.push(ValidationError::EmptyOrigin);
    }

    errors
}

fn validate_game(game: &RawGameConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(max) = game.max_players
        && max < MIN_PLAYERS
    {
        errors.push(ValidationError::TooFewPlayers(max));
    }

    if game.chore_win_threshold == Some(0) {
        errors.push(ValidationError::ZeroChoreThreshold);
    }

    // Zero delays are fine; a zero voting window is not.
    if game.meeting_duration_ms == Some(0) {
        errors.push(ValidationError::ZeroDuration("meeting_duration_ms"));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&RawConfig::default()).is_empty());
    }

    #[test]
    fn collects_every_error() {
        let mut config = RawConfig::default();
        config.server.port = Some(0);
        config.server.allowed_origin = Some("  ".into());
        config.game.max_players = Some(2);
        config.game.chore_win_threshold = Some(0);
        config.game.meeting_duration_ms = Some(0);

        let errors = validate_config(&config);
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroPort,
                ValidationError::EmptyOrigin,
                ValidationError::TooFewPlayers(2),
                ValidationError::ZeroChoreThreshold,
                ValidationError::ZeroDuration("meeting_duration_ms"),
            ]
        );
    }

    #[test]
    fn zero_cooldown_is_allowed() {
        let mut config = RawConfig::default();
        config.game.meeting_initial_delay_ms = Some(0);
        config.game.meeting_cooldown_ms = Some(0);

        assert!(validate_config(&config).is_empty());
    }
}
