//! Strongly-typed identifiers for sabotaged

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of a player within one game session.
///
/// Assigned sequentially at join time starting at 1. A number is never handed
/// out twice within a session, even after the player holding it disconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(u32);

impl PlayerId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// The identity following this one
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a generated chore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoreId(Uuid);

impl ChoreId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChoreId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a connected network client
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one called meeting.
///
/// Vote deadline timers carry the id of the meeting they belong to, so a
/// deadline that fires after that meeting already resolved can be told apart
/// from the deadline of a later meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeetingId(u64);

impl MeetingId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MeetingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "meeting-{}", self.0)
    }
}

/// Identifies one meeting cooldown period
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CooldownToken(u64);

impl CooldownToken {
    pub const fn new(token: u64) -> Self {
        Self(token)
    }
}

impl fmt::Display for CooldownToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cooldown-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_id_ordering() {
        let first = PlayerId::new(1);
        let second = first.next();

        assert_eq!(second.get(), 2);
        assert!(first < second);
    }

    #[test]
    fn chore_id_uniqueness() {
        let c1 = ChoreId::new();
        let c2 = ChoreId::new();
        assert_ne!(c1, c2);
    }

    #[test]
    fn player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId::new(7)).unwrap();
        assert_eq!(json, "7");

        let parsed: PlayerId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, PlayerId::new(7));
    }

    #[test]
    fn ids_serialize_deserialize() {
        let chore_id = ChoreId::new();
        let json = serde_json::to_string(&chore_id).unwrap();
        let parsed: ChoreId = serde_json::from_str(&json).unwrap();
        assert_eq!(chore_id, parsed);

        let client_id = ClientId::new();
        let json = serde_json::to_string(&client_id).unwrap();
        let parsed: ClientId = serde_json::from_str(&json).unwrap();
        assert_eq!(client_id, parsed);
    }
}
