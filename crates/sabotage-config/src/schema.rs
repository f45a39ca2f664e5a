//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};

use crate::CURRENT_CONFIG_VERSION;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Network settings
    #[serde(default)]
    pub server: RawServerConfig,

    /// Game rules and meeting timings
    #[serde(default)]
    pub game: RawGameConfig,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_CONFIG_VERSION,
            server: RawServerConfig::default(),
            game: RawGameConfig::default(),
        }
    }
}

/// Server-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServerConfig {
    /// Listening port (default: 3001)
    pub port: Option<u16>,

    /// Only accept WebSocket handshakes carrying this Origin
    pub allowed_origin: Option<String>,
}

/// Game settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawGameConfig {
    /// Roster capacity (default: 20)
    pub max_players: Option<usize>,

    /// Completed chores needed for a crew win (default: 100)
    pub chore_win_threshold: Option<u32>,

    /// Delay after game start before meetings can be called
    pub meeting_initial_delay_ms: Option<u64>,

    /// How long voting stays open
    pub meeting_duration_ms: Option<u64>,

    /// Delay after a meeting before the next one can be called
    pub meeting_cooldown_ms: Option<u64>,
}
