//! Core game session state machine for sabotaged
//!
//! This crate is the heart of sabotaged, containing:
//! - Chore generation and assignment
//! - The roster of connected players
//! - Impostor selection
//! - Meeting lifecycle (Closed -> Cooldown -> Open -> InProgress -> Cooldown)
//! - Win evaluation
//! - The session controller tying them together
//!
//! Nothing here performs I/O. The engine answers every request with a list of
//! [`CoreEvent`]s, including requests to schedule timers, and the service
//! delivers them.

mod chore;
mod engine;
mod events;
mod meeting;
mod roles;
mod roster;
mod win;

pub use chore::*;
pub use engine::*;
pub use events::*;
pub use meeting::*;
pub use roles::*;
pub use roster::*;
pub use win::*;
