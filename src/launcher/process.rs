//! Process launcher implementation
//!
//! Spawns the configured game server build with `<lobbyName> <port>` as
//! positional arguments. The broker never waits for the process and never
//! verifies that it actually bound its port; the endpoint handed to
//! clients is expected, not yet confirmed reachable.

use crate::error::{BrokerError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::{Child, Command};
use tracing::info;

/// Opaque handle to a spawned (or externally managed) game server process.
///
/// The registry owns one per lobby for the life of the broker. There is
/// deliberately no termination hook today; lobby teardown does not exist,
/// so the process outlives any interest the broker has in it.
#[derive(Debug)]
pub struct GameServerHandle {
    child: Option<Child>,
}

impl GameServerHandle {
    /// Wrap a freshly spawned child process.
    pub fn from_child(child: Child) -> Self {
        Self { child: Some(child) }
    }

    /// Handle for a process the broker does not own, used by test
    /// launchers that never spawn anything.
    pub fn detached() -> Self {
        Self { child: None }
    }

    /// OS pid of the spawned process, if one is attached and still known.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(|c| c.id())
    }
}

/// Trait for launching game server instances
#[async_trait]
pub trait GameServerLauncher: Send + Sync {
    /// Launch a game server for `lobby_name` listening on `port`.
    ///
    /// Implementations must return without waiting for the process to
    /// come up; a spawn failure is a resource error the caller reports
    /// back to the requesting client.
    async fn launch(&self, lobby_name: &str, port: u16) -> Result<GameServerHandle>;
}

/// Production launcher executing the configured game server build
pub struct ProcessLauncher {
    build_path: PathBuf,
}

impl ProcessLauncher {
    pub fn new(build_path: PathBuf) -> Self {
        Self { build_path }
    }
}

#[async_trait]
impl GameServerLauncher for ProcessLauncher {
    async fn launch(&self, lobby_name: &str, port: u16) -> Result<GameServerHandle> {
        if !self.build_path.exists() {
            return Err(BrokerError::LaunchFailed {
                message: format!(
                    "game server build not found at {}",
                    self.build_path.display()
                ),
            }
            .into());
        }

        let child = Command::new(&self.build_path)
            .arg(lobby_name)
            .arg(port.to_string())
            .spawn()
            .map_err(|e| BrokerError::LaunchFailed {
                message: e.to_string(),
            })?;

        info!(
            "Spawned game server for lobby '{}' on port {} (pid {:?})",
            lobby_name,
            port,
            child.id()
        );

        Ok(GameServerHandle::from_child(child))
    }
}
