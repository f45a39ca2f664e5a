//! Configuration parsing and validation for sabotaged
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Server settings (port, allowed origin)
//! - Game rules and meeting timings
//! - Validation with clear error messages
//!
//! Every key is optional. The service layers environment variables and
//! command line flags over the file before validating.

mod schema;
mod settings;
mod validation;

pub use schema::*;
pub use settings::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Fewest players a game can start with (two impostors plus one crewmate)
pub const MIN_PLAYERS: usize = 3;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    build_settings(load_raw(path)?)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Settings> {
    build_settings(parse_raw(content)?)
}

/// Read a TOML file without validating it, so overrides can be applied first
pub fn load_raw(path: impl AsRef<Path>) -> ConfigResult<RawConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_raw(&content)
}

fn parse_raw(content: &str) -> ConfigResult<RawConfig> {
    Ok(toml::from_str(content)?)
}

/// Check version, validate, and convert a raw configuration
pub fn build_settings(raw: RawConfig) -> ConfigResult<Settings> {
    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    let settings = Settings::from_raw(raw);
    tracing::debug!(
        port = settings.server.port,
        max_players = settings.game.max_players,
        "Configuration validated"
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn parse_minimal_config() {
        let settings = parse_config("config_version = 1").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn parse_full_config() {
        let config = r#"
            config_version = 1

            [server]
            port = 8080
            allowed_origin = "http://localhost:5173"

            [game]
            max_players = 10
            chore_win_threshold = 40
            meeting_initial_delay_ms = 1000
            meeting_duration_ms = 2000
            meeting_cooldown_ms = 3000
        "#;

        let settings = parse_config(config).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(
            settings.server.allowed_origin.as_deref(),
            Some("http://localhost:5173")
        );
        assert_eq!(settings.game.max_players, 10);
        assert_eq!(settings.game.chore_win_threshold, 40);
        assert_eq!(settings.game.meeting_initial_delay, Duration::from_secs(1));
        assert_eq!(settings.game.meeting_duration, Duration::from_secs(2));
        assert_eq!(settings.game.meeting_cooldown, Duration::from_secs(3));
    }

    #[test]
    fn reject_wrong_version() {
        let result = parse_config("config_version = 99");
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_invalid_values() {
        let config = r#"
            config_version = 1

            [game]
            max_players = 1
        "#;

        match parse_config(config) {
            Err(ConfigError::ValidationFailed { errors }) => {
                assert_eq!(errors, vec![ValidationError::TooFewPlayers(1)]);
            }
            other => panic!("Expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "config_version = 1\n[server]\nport = 9000").unwrap();

        let settings = load_config(file.path()).unwrap();
        assert_eq!(settings.server.port, 9000);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
