//! Validated settings structures

use crate::schema::{RawConfig, RawGameConfig, RawServerConfig};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default listening port
pub const DEFAULT_PORT: u16 = 3001;

/// Default roster capacity
pub const DEFAULT_MAX_PLAYERS: usize = 20;

/// Default number of completed chores that wins the game for the crew
pub const DEFAULT_CHORE_WIN_THRESHOLD: u32 = 100;

pub const DEFAULT_MEETING_INITIAL_DELAY_MS: u64 = 120_000;
pub const DEFAULT_MEETING_DURATION_MS: u64 = 120_000;
pub const DEFAULT_MEETING_COOLDOWN_MS: u64 = 300_000;

/// Validated settings ready for use by the service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub server: ServerConfig,
    pub game: GameConfig,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            server: ServerConfig::from_raw(raw.server),
            game: GameConfig::from_raw(raw.game),
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// None accepts any Origin
    pub allowed_origin: Option<String>,
}

impl ServerConfig {
    fn from_raw(raw: RawServerConfig) -> Self {
        Self {
            port: raw.port.unwrap_or(DEFAULT_PORT),
            allowed_origin: raw.allowed_origin,
        }
    }

    /// Address to bind the listener to (all interfaces)
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_raw(RawServerConfig::default())
    }
}

/// Game rules and meeting timings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub max_players: usize,
    pub chore_win_threshold: u32,
    /// Meetings stay closed this long after the game starts
    pub meeting_initial_delay: Duration,
    /// Voting window of a called meeting
    pub meeting_duration: Duration,
    /// Meetings stay closed this long after a meeting resolves
    pub meeting_cooldown: Duration,
}

impl GameConfig {
    fn from_raw(raw: RawGameConfig) -> Self {
        Self {
            max_players: raw.max_players.unwrap_or(DEFAULT_MAX_PLAYERS),
            chore_win_threshold: raw
                .chore_win_threshold
                .unwrap_or(DEFAULT_CHORE_WIN_THRESHOLD),
            meeting_initial_delay: Duration::from_millis(
                raw.meeting_initial_delay_ms
                    .unwrap_or(DEFAULT_MEETING_INITIAL_DELAY_MS),
            ),
            meeting_duration: Duration::from_millis(
                raw.meeting_duration_ms.unwrap_or(DEFAULT_MEETING_DURATION_MS),
            ),
            meeting_cooldown: Duration::from_millis(
                raw.meeting_cooldown_ms.unwrap_or(DEFAULT_MEETING_COOLDOWN_MS),
            ),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_raw(RawGameConfig::default())
    }
}
