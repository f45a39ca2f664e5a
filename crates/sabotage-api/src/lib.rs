//! Protocol types for sabotaged
//!
//! This crate defines the stable API between sabotaged and game clients:
//! - Commands (requests from clients)
//! - Events (service -> clients, targeted or broadcast)
//! - Shared views of players, chores and the session
//! - Versioning

mod commands;
mod events;
mod types;

pub use commands::*;
pub use events::*;
pub use types::*;

/// Current API version
pub const API_VERSION: u32 = 1;
