//! Lobby registry implementation
//!
//! `LobbyRegistry` is the single serialization point of the broker: the
//! lobby map, the server-info map, and the port allocator live together in
//! one state struct behind one async mutex, so every
//! check-then-allocate-then-insert sequence is a single critical section
//! across all connection tasks.

use crate::error::{BrokerError, Result};
use crate::launcher::GameServerLauncher;
use crate::protocol::ServerPayload;
use crate::registry::lobby::{GameServerInfo, Lobby};
use crate::registry::ports::PortAllocator;
use crate::types::{ClientHandle, LobbyName};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Statistics about registry operations
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    /// Total number of lobbies created
    pub lobbies_created: u64,
    /// Total number of accepted joins
    pub joins_accepted: u64,
    /// Creates rejected because the name was taken
    pub creates_rejected: u64,
    /// Joins rejected because the lobby did not exist
    pub joins_rejected: u64,
    /// Creates that failed because the game server would not launch
    pub launch_failures: u64,
    /// Current number of registered lobbies
    pub active_lobbies: usize,
}

/// The registry's mutable state, guarded as one unit.
///
/// The three fields must never be split behind separate locks: two
/// concurrent creates for the same name must not both observe "absent",
/// and two creates for different names must not receive the same port.
struct RegistryState {
    lobbies: HashMap<LobbyName, Lobby>,
    servers: HashMap<LobbyName, GameServerInfo>,
    ports: PortAllocator,
}

/// The authoritative lobby/server registry
pub struct LobbyRegistry {
    state: Mutex<RegistryState>,
    launcher: Arc<dyn GameServerLauncher>,
    /// IP advertised to clients in every LobbyInfo reply
    advertise_ip: IpAddr,
    stats: RwLock<RegistryStats>,
}

impl LobbyRegistry {
    pub fn new(launcher: Arc<dyn GameServerLauncher>, advertise_ip: IpAddr, base_port: u16) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                lobbies: HashMap::new(),
                servers: HashMap::new(),
                ports: PortAllocator::new(base_port),
            }),
            launcher,
            advertise_ip,
            stats: RwLock::new(RegistryStats::default()),
        }
    }

    /// Create a lobby and spawn its game server.
    ///
    /// The whole sequence (existence check, port reservation, launch,
    /// insertion) runs under the state lock. A duplicate name or a launch
    /// failure leaves the registry byte-for-byte unchanged, and a failed
    /// launch does not consume a port.
    pub async fn create_lobby(
        &self,
        lobby_name: &str,
        requester: ClientHandle,
    ) -> Result<ServerPayload> {
        let mut state = self.state.lock().await;

        if state.lobbies.contains_key(lobby_name) {
            info!(
                "Rejected CreateLobby from {}: lobby '{}' already exists",
                requester.addr(),
                lobby_name
            );
            self.bump(|s| s.creates_rejected += 1);
            return Err(BrokerError::LobbyNameTaken {
                lobby_name: lobby_name.to_string(),
            }
            .into());
        }

        let port = state.ports.peek()?;

        let process = match self.launcher.launch(lobby_name, port).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(
                    "Game server launch failed for lobby '{}' on port {}: {}",
                    lobby_name, port, e
                );
                self.bump(|s| s.launch_failures += 1);
                return Err(e);
            }
        };

        // Launch succeeded; commit the port and the registry entries
        // together before the lock is released.
        state.ports.advance()?;

        let server_info =
            GameServerInfo::new(lobby_name.to_string(), process, self.advertise_ip, port);
        let reply = server_info.lobby_info();

        info!(
            "Server instance started for lobby '{}' on port {} (pid {:?}), creator {}",
            lobby_name,
            port,
            server_info.pid(),
            requester.addr()
        );

        state
            .lobbies
            .insert(lobby_name.to_string(), Lobby::new(lobby_name.to_string(), requester));
        state.servers.insert(lobby_name.to_string(), server_info);

        let active = state.lobbies.len();
        self.bump(|s| {
            s.lobbies_created += 1;
            s.active_lobbies = active;
        });

        Ok(reply)
    }

    /// Add the requester to an existing lobby and reply with the same
    /// LobbyInfo the creator received.
    pub async fn join_lobby(
        &self,
        lobby_name: &str,
        requester: ClientHandle,
    ) -> Result<ServerPayload> {
        let mut state = self.state.lock().await;

        let Some(lobby) = state.lobbies.get_mut(lobby_name) else {
            info!(
                "Rejected JoinLobby from {}: lobby '{}' does not exist",
                requester.addr(),
                lobby_name
            );
            self.bump(|s| s.joins_rejected += 1);
            return Err(BrokerError::LobbyNotFound {
                lobby_name: lobby_name.to_string(),
            }
            .into());
        };

        info!(
            "Client {} joined lobby '{}' ({} members)",
            requester.addr(),
            lobby_name,
            lobby.member_count() + 1
        );
        lobby.add_member(requester);

        let server_info = state
            .servers
            .get(lobby_name)
            .ok_or_else(|| BrokerError::InternalError {
                message: format!("lobby '{}' has no server info", lobby_name),
            })?;

        self.bump(|s| s.joins_accepted += 1);
        Ok(server_info.lobby_info())
    }

    /// Current lobby names, in registry iteration order.
    pub async fn list_lobbies(&self) -> ServerPayload {
        let state = self.state.lock().await;
        let lobby_names: Vec<String> = state.lobbies.keys().cloned().collect();
        debug!("Listing {} lobbies", lobby_names.len());
        ServerPayload::LobbyList { lobby_names }
    }

    /// Snapshot of the operation counters
    pub fn stats(&self) -> RegistryStats {
        self.stats
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Membership size of a lobby, if it exists
    pub async fn member_count(&self, lobby_name: &str) -> Option<usize> {
        let state = self.state.lock().await;
        state.lobbies.get(lobby_name).map(|l| l.member_count())
    }

    /// Endpoint of the game server backing a lobby, if it exists
    pub async fn server_endpoint(&self, lobby_name: &str) -> Option<(IpAddr, u16)> {
        let state = self.state.lock().await;
        state
            .servers
            .get(lobby_name)
            .map(|info| (info.ip(), info.port()))
    }

    fn bump<F: FnOnce(&mut RegistryStats)>(&self, update: F) {
        match self.stats.write() {
            Ok(mut stats) => update(&mut stats),
            Err(_) => warn!("Registry stats lock poisoned; dropping update"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::GameServerHandle;
    use async_trait::async_trait;
    use std::net::Ipv4Addr;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::mpsc;

    /// Launcher that records launches instead of spawning processes
    struct RecordingLauncher {
        launches: StdMutex<Vec<(String, u16)>>,
        fail_next: StdMutex<bool>,
    }

    impl RecordingLauncher {
        fn new() -> Self {
            Self {
                launches: StdMutex::new(Vec::new()),
                fail_next: StdMutex::new(false),
            }
        }

        fn fail_next(&self) {
            *self.fail_next.lock().unwrap() = true;
        }

        fn launches(&self) -> Vec<(String, u16)> {
            self.launches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GameServerLauncher for RecordingLauncher {
        async fn launch(&self, lobby_name: &str, port: u16) -> Result<GameServerHandle> {
            if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
                return Err(BrokerError::LaunchFailed {
                    message: "injected failure".to_string(),
                }
                .into());
            }
            self.launches
                .lock()
                .unwrap()
                .push((lobby_name.to_string(), port));
            Ok(GameServerHandle::detached())
        }
    }

    fn test_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))
    }

    fn test_registry() -> (Arc<LobbyRegistry>, Arc<RecordingLauncher>) {
        let launcher = Arc::new(RecordingLauncher::new());
        let registry = Arc::new(LobbyRegistry::new(launcher.clone(), test_ip(), 3001));
        (registry, launcher)
    }

    fn test_client() -> ClientHandle {
        let (tx, _rx) = mpsc::unbounded_channel();
        ClientHandle::new("127.0.0.1:0".parse().unwrap(), tx)
    }

    #[tokio::test]
    async fn test_create_assigns_base_port_and_launches() {
        let (registry, launcher) = test_registry();

        let reply = registry.create_lobby("alpha", test_client()).await.unwrap();
        assert_eq!(
            reply,
            ServerPayload::LobbyInfo {
                ip: "10.0.0.5".to_string(),
                port: 3001,
            }
        );
        assert_eq!(launcher.launches(), vec![("alpha".to_string(), 3001)]);
        assert_eq!(registry.member_count("alpha").await, Some(1));
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected_without_mutation() {
        let (registry, launcher) = test_registry();

        registry.create_lobby("alpha", test_client()).await.unwrap();
        let err = registry
            .create_lobby("alpha", test_client())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Lobby name taken");
        // Membership, server info, and the port counter are untouched.
        assert_eq!(registry.member_count("alpha").await, Some(1));
        assert_eq!(
            registry.server_endpoint("alpha").await,
            Some((test_ip(), 3001))
        );
        assert_eq!(launcher.launches().len(), 1);

        // The next distinct create still gets the next port, proving the
        // rejected attempt consumed nothing.
        let reply = registry.create_lobby("beta", test_client()).await.unwrap();
        assert_eq!(
            reply,
            ServerPayload::LobbyInfo {
                ip: "10.0.0.5".to_string(),
                port: 3002,
            }
        );
    }

    #[tokio::test]
    async fn test_join_returns_creator_endpoint() {
        let (registry, _launcher) = test_registry();

        let created = registry.create_lobby("beta", test_client()).await.unwrap();
        let joined = registry.join_lobby("beta", test_client()).await.unwrap();

        assert_eq!(created, joined);
        assert_eq!(registry.member_count("beta").await, Some(2));
    }

    #[tokio::test]
    async fn test_join_unknown_lobby_is_rejected() {
        let (registry, _launcher) = test_registry();

        let err = registry
            .join_lobby("gamma", test_client())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Lobby does not exist");
        assert_eq!(registry.member_count("gamma").await, None);
    }

    #[tokio::test]
    async fn test_list_tracks_created_lobbies_only() {
        let (registry, _launcher) = test_registry();

        registry.create_lobby("alpha", test_client()).await.unwrap();
        registry.create_lobby("beta", test_client()).await.unwrap();
        registry.join_lobby("alpha", test_client()).await.unwrap();
        let _ = registry.join_lobby("gamma", test_client()).await;

        let ServerPayload::LobbyList { mut lobby_names } = registry.list_lobbies().await else {
            panic!("expected LobbyList");
        };
        lobby_names.sort();
        assert_eq!(lobby_names, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_launch_failure_burns_no_port() {
        let (registry, launcher) = test_registry();

        launcher.fail_next();
        let err = registry
            .create_lobby("alpha", test_client())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("injected failure"));

        // Nothing registered and the port was not consumed.
        assert_eq!(registry.member_count("alpha").await, None);
        let reply = registry.create_lobby("beta", test_client()).await.unwrap();
        assert_eq!(
            reply,
            ServerPayload::LobbyInfo {
                ip: "10.0.0.5".to_string(),
                port: 3001,
            }
        );
    }

    #[tokio::test]
    async fn test_stats_counters() {
        let (registry, launcher) = test_registry();

        registry.create_lobby("alpha", test_client()).await.unwrap();
        let _ = registry.create_lobby("alpha", test_client()).await;
        registry.join_lobby("alpha", test_client()).await.unwrap();
        let _ = registry.join_lobby("missing", test_client()).await;
        launcher.fail_next();
        let _ = registry.create_lobby("broken", test_client()).await;

        let stats = registry.stats();
        assert_eq!(stats.lobbies_created, 1);
        assert_eq!(stats.creates_rejected, 1);
        assert_eq!(stats.joins_accepted, 1);
        assert_eq!(stats.joins_rejected, 1);
        assert_eq!(stats.launch_failures, 1);
        assert_eq!(stats.active_lobbies, 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_with_distinct_names_get_distinct_ports() {
        let (registry, _launcher) = test_registry();

        let mut tasks = Vec::new();
        for i in 0..16 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                registry
                    .create_lobby(&format!("lobby-{}", i), test_client())
                    .await
                    .unwrap()
            }));
        }

        let mut ports = Vec::new();
        for task in tasks {
            let ServerPayload::LobbyInfo { port, .. } = task.await.unwrap() else {
                panic!("expected LobbyInfo");
            };
            ports.push(port);
        }

        ports.sort_unstable();
        let expected: Vec<u16> = (3001..3001 + 16).collect();
        assert_eq!(ports, expected);
    }

    #[tokio::test]
    async fn test_concurrent_creates_with_same_name_one_winner() {
        let (registry, launcher) = test_registry();

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                registry.create_lobby("contested", test_client()).await
            }));
        }

        let mut successes = 0;
        let mut rejections = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => {
                    assert_eq!(e.to_string(), "Lobby name taken");
                    rejections += 1;
                }
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(rejections, 7);
        assert_eq!(launcher.launches().len(), 1);
        assert_eq!(registry.member_count("contested").await, Some(1));
    }
}
