//! Peer-to-peer energy trading game simulator.

/// Read-only REST API over a finished game.
#[cfg(feature = "api")]
pub mod api;
/// TOML configuration, presets, and validation.
pub mod config;
pub mod error;
pub mod io;
/// Participant archetypes and the player balance sheet.
pub mod participants;
/// Game engine, market model, event bus, and tick drivers.
pub mod sim;
