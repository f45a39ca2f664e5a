//! Win evaluation

use sabotage_api::WinReason;

use crate::Roster;

/// Decide whether the game is over.
///
/// Conditions are checked in a fixed order and the first one that holds
/// decides the outcome:
/// 1. no impostor alive: crew wins
/// 2. living impostors at least as many as living crewmates: impostors win
/// 3. `chores_completed` reached `threshold`: crew wins
pub fn evaluate(roster: &Roster, chores_completed: u32, threshold: u32) -> Option<WinReason> {
    let impostors = roster.living_impostors().count();
    let crewmates = roster.living_crewmates().count();

    if impostors == 0 {
        Some(WinReason::ImpostorsEliminated)
    } else if impostors >= crewmates {
        Some(WinReason::Outnumbered)
    } else if chores_completed >= threshold {
        Some(WinReason::ChoresCompleted)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sabotage_util::ClientId;

    /// Roster with `impostors` impostors followed by `crew` crewmates, all alive
    fn roster(impostors: usize, crew: usize) -> Roster {
        let mut roster = Roster::new(20);
        for i in 0..impostors + crew {
            roster.add(format!("p{}", i), ClientId::new()).unwrap();
        }
        for player in roster.players_mut().iter_mut().take(impostors) {
            player.is_impostor = true;
        }
        roster
    }

    #[test]
    fn test_game_continues() {
        assert_eq!(evaluate(&roster(2, 3), 0, 100), None);
    }

    #[test]
    fn test_no_impostors_left() {
        let mut r = roster(2, 3);
        r.players_mut()[0].is_alive = false;
        r.players_mut()[1].is_alive = false;

        assert_eq!(evaluate(&r, 0, 100), Some(WinReason::ImpostorsEliminated));
    }

    #[test]
    fn test_impostors_outnumber() {
        assert_eq!(evaluate(&roster(2, 2), 0, 100), Some(WinReason::Outnumbered));
        assert_eq!(evaluate(&roster(2, 1), 0, 100), Some(WinReason::Outnumbered));
    }

    #[test]
    fn test_dead_crew_do_not_count() {
        let mut r = roster(2, 4);
        r.players_mut()[2].is_alive = false;
        r.players_mut()[3].is_alive = false;

        assert_eq!(evaluate(&r, 0, 100), Some(WinReason::Outnumbered));
    }

    #[test]
    fn test_chore_threshold() {
        assert_eq!(evaluate(&roster(2, 3), 99, 100), None);
        assert_eq!(
            evaluate(&roster(2, 3), 100, 100),
            Some(WinReason::ChoresCompleted)
        );
    }

    #[test]
    fn test_elimination_checked_before_chores() {
        let mut r = roster(1, 3);
        r.players_mut()[0].is_alive = false;

        assert_eq!(evaluate(&r, 500, 100), Some(WinReason::ImpostorsEliminated));
    }

    #[test]
    fn test_outnumber_checked_before_chores() {
        assert_eq!(evaluate(&roster(2, 1), 500, 100), Some(WinReason::Outnumbered));
    }
}
