//! Lobby registry for the broker
//!
//! This module is the single source of truth for lobby membership, game
//! server endpoints, and port allocation. All mutation is serialized
//! through [`manager::LobbyRegistry`].

pub mod lobby;
pub mod manager;
pub mod ports;

// Re-export commonly used types
pub use lobby::{GameServerInfo, Lobby};
pub use manager::{LobbyRegistry, RegistryStats};
pub use ports::PortAllocator;
