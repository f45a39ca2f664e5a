//! Command types for the sabotaged protocol

use sabotage_util::{ChoreId, PlayerId};
use serde::{Deserialize, Serialize};

use crate::API_VERSION;

/// Request wrapper with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// API version (clients may omit it)
    #[serde(default = "current_api_version")]
    pub api_version: u32,
    /// The command
    pub command: Command,
}

impl Request {
    pub fn new(command: Command) -> Self {
        Self {
            api_version: API_VERSION,
            command,
        }
    }
}

fn current_api_version() -> u32 {
    API_VERSION
}

/// All possible commands from clients
///
/// Identities carried in a command are taken at face value; the service does
/// not check that the sending connection owns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Join the lobby under a display name
    JoinGame { player_name: String },

    /// Start the game (needs at least three players)
    StartGame,

    /// Mark one of the player's chores as done
    CompleteTask { player_id: PlayerId, task_id: ChoreId },

    /// Call an emergency meeting
    CallMeeting { player_id: PlayerId },

    /// Cast or replace a vote in the running meeting
    CastVote {
        voter_id: PlayerId,
        target_id: PlayerId,
    },
}

impl Command {
    /// Short name used in log output
    pub fn name(&self) -> &'static str {
        match self {
            Command::JoinGame { .. } => "join_game",
            Command::StartGame => "start_game",
            Command::CompleteTask { .. } => "complete_task",
            Command::CallMeeting { .. } => "call_meeting",
            Command::CastVote { .. } => "cast_vote",
        }
    }
}
