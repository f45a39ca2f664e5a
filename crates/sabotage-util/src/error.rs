//! Error types for sabotaged

use thiserror::Error;

use crate::{ChoreId, MeetingId, PlayerId};

/// Core error type for game session operations
///
/// Only [`SabotageError::GameFull`] is ever reported to a client. Everything
/// else describes a request whose precondition did not hold; those requests
/// are dropped without any observable effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SabotageError {
    #[error("Game is full")]
    GameFull,

    #[error("Not enough players: {have} joined, {need} required")]
    NotEnoughPlayers { have: usize, need: usize },

    #[error("Game already started")]
    AlreadyStarted,

    #[error("Connection already has player {0}")]
    AlreadyJoined(PlayerId),

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Player {0} is not alive")]
    PlayerNotAlive(PlayerId),

    #[error("Chore not found: {0}")]
    ChoreNotFound(ChoreId),

    #[error("Chore already completed: {0}")]
    ChoreAlreadyCompleted(ChoreId),

    #[error("Meetings cannot be called right now")]
    MeetingNotOpen,

    #[error("No meeting in progress")]
    NoMeetingInProgress,

    #[error("Stale timer for {0}")]
    StaleMeetingTimer(MeetingId),

    #[error("Stale cooldown timer")]
    StaleCooldownTimer,
}

impl SabotageError {
    /// Whether the error must be surfaced to the requesting client
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::GameFull)
    }
}

pub type Result<T> = std::result::Result<T, SabotageError>;
