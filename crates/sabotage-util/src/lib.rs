//! Shared utilities for sabotaged
//!
//! This crate provides:
//! - ID types (PlayerId, ChoreId, ClientId, MeetingId, CooldownToken)
//! - Time utilities (wall clock and monotonic time)
//! - Error types

mod error;
mod ids;
mod time;

pub use error::*;
pub use ids::*;
pub use time::*;
