//! Event types for sabotaged -> client streaming

use chrono::{DateTime, Local};
use sabotage_util::{ChoreId, PlayerId};
use serde::{Deserialize, Serialize};

use crate::{PlayerView, SessionSnapshot, WinReason, API_VERSION};

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub api_version: u32,
    pub timestamp: DateTime<Local>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            api_version: API_VERSION,
            timestamp: sabotage_util::now(),
            payload,
        }
    }
}

/// All possible events from the service to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// Sent only to the joining connection: the player it now controls
    PlayerJoined { player: PlayerView },

    /// Roster changed (join or disconnect)
    PlayersUpdate { players: Vec<PlayerView> },

    /// Sent only to the connection whose request failed
    Error { message: String },

    /// Game has started; carries the full session state
    GameStarted { state: SessionSnapshot },

    /// A chore was completed
    TaskCompleted {
        player_id: PlayerId,
        task_id: ChoreId,
    },

    /// A meeting was called
    MeetingCalled { player_id: PlayerId },

    /// A player was voted out
    PlayerEjected {
        player_id: PlayerId,
        was_impostor: bool,
    },

    /// Voting is over
    MeetingEnded,

    /// Game over, crew side won
    CrewmatesWin { reason: WinReason },

    /// Game over, impostor side won
    ImpostorsWin { reason: WinReason },
}
