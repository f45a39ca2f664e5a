//! Config validation CLI tool
//!
//! Validates a sabotaged configuration file and reports any errors.

use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Usage: validate-config <config-file>");
            eprintln!();
            eprintln!("Validates a sabotaged configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config sabotage.toml");
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match sabotage_config::load_config(&config_path) {
        Ok(settings) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", sabotage_config::CURRENT_CONFIG_VERSION);
            println!("  Port: {}", settings.server.port);
            println!(
                "  Allowed origin: {}",
                settings.server.allowed_origin.as_deref().unwrap_or("(any)")
            );
            println!("  Max players: {}", settings.game.max_players);
            println!("  Chore win threshold: {}", settings.game.chore_win_threshold);
            println!(
                "  Meetings: open after {}ms, vote for {}ms, cooldown {}ms",
                settings.game.meeting_initial_delay.as_millis(),
                settings.game.meeting_duration.as_millis(),
                settings.game.meeting_cooldown.as_millis()
            );

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                sabotage_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                sabotage_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                sabotage_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                sabotage_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        sabotage_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
