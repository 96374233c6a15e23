//! Game server process launching
//!
//! This module owns the seam between the registry and the operating
//! system: spawning one game-server process per lobby, fire-and-forget.

pub mod process;

// Re-export commonly used types
pub use process::{GameServerHandle, GameServerLauncher, ProcessLauncher};
