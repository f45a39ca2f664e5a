//! Impostor selection

use rand::Rng;
use sabotage_config::MIN_PLAYERS;
use sabotage_util::{PlayerId, Result, SabotageError};

use crate::Roster;

/// Impostors chosen at the start of every game
pub const IMPOSTOR_COUNT: usize = 2;

/// Secretly pick the impostors for a new game.
///
/// Every player is first reset to a living crewmate. Impostors are then drawn
/// uniformly without replacement from the whole roster, so the chosen players
/// are always distinct. Fails without touching the roster when fewer than
/// [`MIN_PLAYERS`] have joined.
pub fn assign_impostors<R: Rng + ?Sized>(
    roster: &mut Roster,
    rng: &mut R,
) -> Result<[PlayerId; IMPOSTOR_COUNT]> {
    if roster.len() < MIN_PLAYERS {
        return Err(SabotageError::NotEnoughPlayers {
            have: roster.len(),
            need: MIN_PLAYERS,
        });
    }

    for player in roster.iter_mut() {
        player.is_impostor = false;
        player.is_alive = true;
    }

    let mut pool: Vec<usize> = (0..roster.len()).collect();
    let picked: [usize; IMPOSTOR_COUNT] =
        std::array::from_fn(|_| pool.swap_remove(rng.random_range(0..pool.len())));

    let players = roster.players_mut();
    Ok(picked.map(|index| {
        players[index].is_impostor = true;
        players[index].id
    }))
}
