//! Core events emitted by the engine

use sabotage_api::{Faction, PlayerView, SessionSnapshot, WinReason};
use sabotage_util::{ChoreId, ClientId, MeetingId, PlayerId};
use std::time::Duration;

use crate::Timer;

/// Events emitted by the core engine
///
/// Events naming a `client_id` go to that connection only. All others are
/// broadcast, except [`CoreEvent::ScheduleTimer`], which is for the service.
#[derive(Debug, Clone)]
pub enum CoreEvent {
    /// A connection joined as a new player
    PlayerJoined {
        client_id: ClientId,
        player: PlayerView,
    },

    /// A join request was refused
    JoinRejected { client_id: ClientId, reason: String },

    /// Roster changed
    RosterChanged { players: Vec<PlayerView> },

    /// Roles and chores are assigned
    GameStarted { snapshot: SessionSnapshot },

    ChoreCompleted {
        player_id: PlayerId,
        chore_id: ChoreId,
    },

    MeetingCalled {
        meeting_id: MeetingId,
        called_by: PlayerId,
    },

    PlayerEjected {
        player_id: PlayerId,
        was_impostor: bool,
    },

    /// Voting closed, with or without an ejection
    MeetingEnded {
        meeting_id: MeetingId,
        ejected: Option<PlayerId>,
        duration: Duration,
    },

    /// The game is over and the session has been reset
    GameOver { winner: Faction, reason: WinReason },

    /// Deliver `timer` back to the engine once `after` has passed
    ScheduleTimer { timer: Timer, after: Duration },
}
