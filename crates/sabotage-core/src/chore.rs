//! Chore generation and assignment

use rand::Rng;
use sabotage_api::{ChoreCategory, ChorePayload, ChoreView, Shape};
use sabotage_util::ChoreId;

use crate::Roster;

/// Chores handed to every living crewmate when the game starts
pub const CHORES_PER_PLAYER: usize = 2;

/// Rooms are numbered 1 through this value
pub const ROOM_COUNT: u8 = 12;

/// Longest input sequence of a sequence chore
pub const MAX_SEQUENCE_LEN: usize = 4;

/// Largest value a sequence input can take
pub const MAX_SEQUENCE_VALUE: u8 = 3;

/// A chore owned by one player
///
/// Everything except the completion flag is fixed at generation time.
#[derive(Debug, Clone)]
pub struct Chore {
    id: ChoreId,
    room_number: u8,
    payload: ChorePayload,
    completed: bool,
}

impl Chore {
    /// Generate a fresh chore of the given category
    pub fn generate<R: Rng + ?Sized>(category: ChoreCategory, rng: &mut R) -> Self {
        let payload = match category {
            ChoreCategory::Sequence => {
                let len = rng.random_range(1..=MAX_SEQUENCE_LEN);
                ChorePayload::Sequence {
                    sequence: (0..len)
                        .map(|_| rng.random_range(0..=MAX_SEQUENCE_VALUE))
                        .collect(),
                }
            }
            ChoreCategory::Shapes => ChorePayload::Shapes {
                shapes: std::array::from_fn(|_| Shape::ALL[rng.random_range(0..Shape::ALL.len())]),
            },
            ChoreCategory::Simple => ChorePayload::Simple,
        };

        Self {
            id: ChoreId::new(),
            room_number: rng.random_range(1..=ROOM_COUNT),
            payload,
            completed: false,
        }
    }

    pub fn id(&self) -> ChoreId {
        self.id
    }

    pub fn room_number(&self) -> u8 {
        self.room_number
    }

    pub fn payload(&self) -> &ChorePayload {
        &self.payload
    }

    pub fn category(&self) -> ChoreCategory {
        self.payload.category()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Mark the chore done. Returns false if it already was.
    pub fn mark_completed(&mut self) -> bool {
        !std::mem::replace(&mut self.completed, true)
    }

    pub fn to_view(&self) -> ChoreView {
        ChoreView {
            id: self.id,
            kind: self.category().number(),
            room_number: self.room_number,
            completed: self.completed,
            payload: self.payload.clone(),
        }
    }
}

/// Pick one of the three categories uniformly
pub fn random_category<R: Rng + ?Sized>(rng: &mut R) -> ChoreCategory {
    ChoreCategory::ALL[rng.random_range(0..ChoreCategory::ALL.len())]
}

/// Give every living crewmate a fresh set of chores.
///
/// Impostors and eliminated players get nothing. Existing chore lists of
/// eligible players are replaced. Returns how many chores were generated.
pub fn assign_chores<R: Rng + ?Sized>(roster: &mut Roster, rng: &mut R) -> u32 {
    let mut generated = 0;

    for player in roster.iter_mut() {
        if player.is_impostor || !player.is_alive {
            continue;
        }

        player.chores = (0..CHORES_PER_PLAYER)
            .map(|_| Chore::generate(random_category(rng), rng))
            .collect();
        generated += CHORES_PER_PLAYER as u32;
    }

    generated
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sabotage_util::ClientId;

    #[test]
    fn sequence_chore_shape() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let chore = Chore::generate(ChoreCategory::Sequence, &mut rng);
            match chore.payload() {
                ChorePayload::Sequence { sequence } => {
                    assert!((1..=MAX_SEQUENCE_LEN).contains(&sequence.len()));
                    assert!(sequence.iter().all(|v| *v <= MAX_SEQUENCE_VALUE));
                }
                other => panic!("Expected sequence payload, got {:?}", other),
            }
        }
    }

    #[test]
    fn shapes_chore_has_four_labels() {
        let mut rng = StdRng::seed_from_u64(11);
        let chore = Chore::generate(ChoreCategory::Shapes, &mut rng);

        assert_eq!(chore.category(), ChoreCategory::Shapes);
        assert!(matches!(chore.payload(), ChorePayload::Shapes { shapes } if shapes.len() == 4));
    }

    #[test]
    fn simple_chore_has_no_payload() {
        let mut rng = StdRng::seed_from_u64(3);
        let chore = Chore::generate(ChoreCategory::Simple, &mut rng);
        assert_eq!(chore.payload(), &ChorePayload::Simple);
    }

    #[test]
    fn room_numbers_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..500 {
            let chore = Chore::generate(random_category(&mut rng), &mut rng);
            assert!((1..=ROOM_COUNT).contains(&chore.room_number()));
        }
    }

    #[test]
    fn every_category_gets_picked() {
        let mut rng = StdRng::seed_from_u64(9);
        let picked: Vec<_> = (0..100).map(|_| random_category(&mut rng)).collect();

        for category in ChoreCategory::ALL {
            assert!(picked.contains(&category), "{:?} never picked", category);
        }
    }

    #[test]
    fn view_carries_category_number() {
        let mut rng = StdRng::seed_from_u64(2);

        for category in ChoreCategory::ALL {
            let view = Chore::generate(category, &mut rng).to_view();
            assert_eq!(view.kind, category.number());
            assert_eq!(view.payload.category(), category);
        }
    }

    #[test]
    fn completion_is_monotonic() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut chore = Chore::generate(ChoreCategory::Simple, &mut rng);

        assert!(!chore.is_completed());
        assert!(chore.mark_completed());
        assert!(chore.is_completed());
        assert!(!chore.mark_completed());
        assert!(chore.is_completed());
    }

    #[test]
    fn chores_only_for_living_crewmates() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut roster = Roster::new(20);
        for name in ["a", "b", "c", "d"] {
            roster.add(name.into(), ClientId::new()).unwrap();
        }
        roster.players_mut()[0].is_impostor = true;
        roster.players_mut()[1].is_alive = false;

        let generated = assign_chores(&mut roster, &mut rng);

        assert_eq!(generated, 4);
        assert!(roster.players()[0].chores.is_empty());
        assert!(roster.players()[1].chores.is_empty());
        assert_eq!(roster.players()[2].chores.len(), CHORES_PER_PLAYER);
        assert_eq!(roster.players()[3].chores.len(), CHORES_PER_PLAYER);
    }

    #[test]
    fn reassigning_replaces_chores() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut roster = Roster::new(20);
        roster.add("solo".into(), ClientId::new()).unwrap();

        assign_chores(&mut roster, &mut rng);
        let first: Vec<_> = roster.players()[0].chores.iter().map(Chore::id).collect();
        assign_chores(&mut roster, &mut rng);
        let second: Vec<_> = roster.players()[0].chores.iter().map(Chore::id).collect();

        assert_eq!(second.len(), CHORES_PER_PLAYER);
        assert!(first.iter().all(|id| !second.contains(id)));
    }
}
