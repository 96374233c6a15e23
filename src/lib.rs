//! Lobby Broker - Matchmaking front door for multiplayer game sessions
//!
//! This crate provides a TCP lobby broker: clients create or join named
//! lobbies over a persistent binary protocol, and the broker spawns one
//! dedicated game-server process per lobby and hands its endpoint back.

pub mod config;
pub mod error;
pub mod launcher;
pub mod net;
pub mod protocol;
pub mod registry;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{BrokerError, Result};
pub use types::*;

// Re-export key components
pub use launcher::{GameServerLauncher, ProcessLauncher};
pub use protocol::{ClientPayload, ServerPayload};
pub use registry::LobbyRegistry;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
