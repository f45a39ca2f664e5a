//! Shared types for the sabotaged API

use chrono::{DateTime, Local};
use sabotage_util::{ChoreId, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chore category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoreCategory {
    /// Repeat a short sequence of inputs
    Sequence,
    /// Match four shapes
    Shapes,
    /// Plain interaction, no extra data
    Simple,
}

impl ChoreCategory {
    pub const ALL: [ChoreCategory; 3] = [
        ChoreCategory::Sequence,
        ChoreCategory::Shapes,
        ChoreCategory::Simple,
    ];

    /// Numeric category as shown to players (1, 2 or 3)
    pub fn number(self) -> u8 {
        match self {
            ChoreCategory::Sequence => 1,
            ChoreCategory::Shapes => 2,
            ChoreCategory::Simple => 3,
        }
    }
}

/// Shape labels used by shape-matching chores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Triangle,
    Square,
    Circle,
    Pentagon,
    Hexagon,
}

impl Shape {
    pub const ALL: [Shape; 5] = [
        Shape::Triangle,
        Shape::Square,
        Shape::Circle,
        Shape::Pentagon,
        Shape::Hexagon,
    ];
}

/// Category-specific chore data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum ChorePayload {
    /// 1 to 4 inputs, each in 0..=3
    Sequence { sequence: Vec<u8> },
    /// Exactly four shapes, repeats allowed
    Shapes { shapes: [Shape; 4] },
    Simple,
}

impl ChorePayload {
    pub fn category(&self) -> ChoreCategory {
        match self {
            ChorePayload::Sequence { .. } => ChoreCategory::Sequence,
            ChorePayload::Shapes { .. } => ChoreCategory::Shapes,
            ChorePayload::Simple => ChoreCategory::Simple,
        }
    }
}

/// View of a chore for clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreView {
    pub id: ChoreId,
    /// Category number (1, 2 or 3)
    #[serde(rename = "type")]
    pub kind: u8,
    /// Room the chore must be done in (1..=12)
    pub room_number: u8,
    pub completed: bool,
    pub payload: ChorePayload,
}

/// View of a player for clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub is_impostor: bool,
    pub is_alive: bool,
    pub tasks: Vec<ChoreView>,
}

/// Full session state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub api_version: u32,
    /// Players in join order
    pub players: Vec<PlayerView>,
    pub is_game_started: bool,
    pub total_tasks_completed: u32,
    pub total_tasks_assigned: u32,
    pub can_call_meeting: bool,
    pub meeting_in_progress: bool,
    pub round_start_time: Option<DateTime<Local>>,
    pub last_meeting_time: Option<DateTime<Local>>,
    /// Current ballot, voter -> target
    #[serde(default)]
    pub votes: BTreeMap<PlayerId, PlayerId>,
}

/// Which side won a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Crewmates,
    Impostors,
}

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinReason {
    /// No impostor is left alive
    ImpostorsEliminated,
    /// Living impostors are at least as many as living crewmates
    Outnumbered,
    /// The crew finished enough chores
    ChoresCompleted,
}

impl WinReason {
    pub fn winner(self) -> Faction {
        match self {
            WinReason::ImpostorsEliminated | WinReason::ChoresCompleted => Faction::Crewmates,
            WinReason::Outnumbered => Faction::Impostors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_numbers() {
        assert_eq!(ChoreCategory::Sequence.number(), 1);
        assert_eq!(ChoreCategory::Shapes.number(), 2);
        assert_eq!(ChoreCategory::Simple.number(), 3);
    }

    #[test]
    fn chore_view_sends_category_as_type() {
        let view = ChoreView {
            id: ChoreId::new(),
            kind: ChoreCategory::Simple.number(),
            room_number: 4,
            completed: false,
            payload: ChorePayload::Simple,
        };

        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains(r#""type":3"#));

        let parsed: ChoreView = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, view);
    }

    #[test]
    fn payload_serialization() {
        let payload = ChorePayload::Shapes {
            shapes: [Shape::Circle, Shape::Circle, Shape::Hexagon, Shape::Square],
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains(r#""category":"shapes""#));
        assert!(json.contains("hexagon"));

        let parsed: ChorePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, payload);
    }

    #[test]
    fn shapes_payload_requires_four_labels() {
        let json = r#"{"category":"shapes","shapes":["circle","square"]}"#;
        assert!(serde_json::from_str::<ChorePayload>(json).is_err());
    }

    #[test]
    fn ballot_serializes_with_player_keys() {
        let mut votes = BTreeMap::new();
        votes.insert(PlayerId::new(1), PlayerId::new(3));

        let json = serde_json::to_string(&votes).unwrap();
        assert_eq!(json, r#"{"1":3}"#);

        let parsed: BTreeMap<PlayerId, PlayerId> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, votes);
    }

    #[test]
    fn win_reason_factions() {
        assert_eq!(WinReason::ImpostorsEliminated.winner(), Faction::Crewmates);
        assert_eq!(WinReason::ChoresCompleted.winner(), Faction::Crewmates);
        assert_eq!(WinReason::Outnumbered.winner(), Faction::Impostors);
    }
}
