//! Participant archetypes and the player that adopts one.

/// Static table of participant archetypes.
pub mod catalog;
/// Player balance sheet and battery model.
pub mod player;

pub use catalog::{ParticipantKind, ParticipantType};
pub use player::{EnergyFlow, Player};
