//! Test fixtures and mock implementations for integration testing

use async_trait::async_trait;
use lobby_broker::error::{BrokerError, Result};
use lobby_broker::launcher::{GameServerHandle, GameServerLauncher};
use lobby_broker::protocol::ServerPayload;
use lobby_broker::types::ClientHandle;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Launcher that records every launch instead of spawning processes
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    launches: Arc<Mutex<Vec<(String, u16)>>>,
    fail_next: Arc<Mutex<bool>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded (lobby name, port) launches
    pub fn launches(&self) -> Vec<(String, u16)> {
        self.launches
            .lock()
            .map(|l| l.clone())
            .unwrap_or_default()
    }

    /// Make the next launch fail, simulating a missing or broken build
    pub fn fail_next(&self) {
        if let Ok(mut flag) = self.fail_next.lock() {
            *flag = true;
        }
    }
}

#[async_trait]
impl GameServerLauncher for RecordingLauncher {
    async fn launch(&self, lobby_name: &str, port: u16) -> Result<GameServerHandle> {
        let should_fail = self
            .fail_next
            .lock()
            .map(|mut flag| std::mem::take(&mut *flag))
            .unwrap_or(false);
        if should_fail {
            return Err(BrokerError::LaunchFailed {
                message: "injected launch failure".to_string(),
            }
            .into());
        }

        if let Ok(mut launches) = self.launches.lock() {
            launches.push((lobby_name.to_string(), port));
        }
        Ok(GameServerHandle::detached())
    }
}

/// A client handle plus the receiving end of its reply channel, so tests
/// can observe fire-and-forget sends.
pub fn test_client() -> (ClientHandle, mpsc::UnboundedReceiver<ServerPayload>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = ClientHandle::new("127.0.0.1:0".parse().unwrap(), tx);
    (handle, rx)
}
