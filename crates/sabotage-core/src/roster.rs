//! Players connected to the session

use sabotage_api::PlayerView;
use sabotage_util::{ChoreId, ClientId, PlayerId, Result, SabotageError};

use crate::Chore;

/// A player in the session
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    /// Display name as sent by the client, unvalidated
    pub name: String,
    /// Fixed once the game starts
    pub is_impostor: bool,
    /// Only cleared by a meeting ejection
    pub is_alive: bool,
    /// Connection that joined as this player
    pub client_id: ClientId,
    pub chores: Vec<Chore>,
}

impl Player {
    fn new(id: PlayerId, name: String, client_id: ClientId) -> Self {
        Self {
            id,
            name,
            is_impostor: false,
            is_alive: true,
            client_id,
            chores: Vec::new(),
        }
    }

    pub fn chore_mut(&mut self, chore_id: ChoreId) -> Option<&mut Chore> {
        self.chores.iter_mut().find(|c| c.id() == chore_id)
    }

    pub fn to_view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            is_impostor: self.is_impostor,
            is_alive: self.is_alive,
            tasks: self.chores.iter().map(Chore::to_view).collect(),
        }
    }
}

/// Ordered collection of players, in join order
#[derive(Debug, Clone)]
pub struct Roster {
    players: Vec<Player>,
    capacity: usize,
    next_id: PlayerId,
}

impl Roster {
    pub fn new(capacity: usize) -> Self {
        Self {
            players: Vec::new(),
            capacity,
            next_id: PlayerId::new(1),
        }
    }

    /// Add a player under the next sequential id
    ///
    /// A connection holds at most one player.
    pub fn add(&mut self, name: String, client_id: ClientId) -> Result<&Player> {
        if let Some(existing) = self.players.iter().find(|p| p.client_id == client_id) {
            return Err(SabotageError::AlreadyJoined(existing.id));
        }
        if self.players.len() >= self.capacity {
            return Err(SabotageError::GameFull);
        }

        let id = self.next_id;
        self.next_id = id.next();
        self.players.push(Player::new(id, name, client_id));

        Ok(&self.players[self.players.len() - 1])
    }

    /// Remove the player bound to a connection, if there is one
    pub fn remove_client(&mut self, client_id: &ClientId) -> Option<Player> {
        let index = self
            .players
            .iter()
            .position(|p| &p.client_id == client_id)?;
        Some(self.players.remove(index))
    }

    pub fn find(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn find_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Whether the id belongs to a player who is still alive
    pub fn is_living(&self, id: PlayerId) -> bool {
        self.find(id).is_some_and(|p| p.is_alive)
    }

    pub fn living_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_alive).count()
    }

    pub fn living_crewmates(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive && !p.is_impostor)
    }

    pub fn living_impostors(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive && p.is_impostor)
    }

    pub fn impostors(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_impostor)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Snapshot of every player, in join order
    pub fn views(&self) -> Vec<PlayerView> {
        self.players.iter().map(Player::to_view).collect()
    }
}
