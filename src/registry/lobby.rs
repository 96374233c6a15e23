//! Lobby and game server records
//!
//! A `Lobby` and its `GameServerInfo` are created together on the first
//! successful CreateLobby for a name and live for the life of the broker.

use crate::launcher::GameServerHandle;
use crate::protocol::ServerPayload;
use crate::types::{ClientHandle, LobbyName};
use crate::utils::current_timestamp;
use chrono::{DateTime, Utc};
use std::net::IpAddr;

/// A named group of clients backed by one game server instance
#[derive(Debug)]
pub struct Lobby {
    name: LobbyName,
    /// Members in insertion order; the creator is always first.
    /// Append-only: disconnects do not remove entries.
    members: Vec<ClientHandle>,
    created_at: DateTime<Utc>,
}

impl Lobby {
    /// Create a lobby with the requesting client as sole member
    pub fn new(name: LobbyName, creator: ClientHandle) -> Self {
        Self {
            name,
            members: vec![creator],
            created_at: current_timestamp(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_member(&mut self, member: ClientHandle) {
        self.members.push(member);
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[ClientHandle] {
        &self.members
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Endpoint and process handle of the game server backing one lobby.
///
/// Created atomically with its `Lobby` and never reassigned.
#[derive(Debug)]
pub struct GameServerInfo {
    lobby_name: LobbyName,
    /// Owned handle to the spawned process; nothing reads it today but
    /// ownership keeps a future teardown path possible.
    process: GameServerHandle,
    ip: IpAddr,
    port: u16,
}

impl GameServerInfo {
    pub fn new(lobby_name: LobbyName, process: GameServerHandle, ip: IpAddr, port: u16) -> Self {
        Self {
            lobby_name,
            process,
            ip,
            port,
        }
    }

    pub fn lobby_name(&self) -> &str {
        &self.lobby_name
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn pid(&self) -> Option<u32> {
        self.process.pid()
    }

    /// The LobbyInfo reply for this server. Every joiner receives the
    /// same payload the creator did.
    pub fn lobby_info(&self) -> ServerPayload {
        ServerPayload::LobbyInfo {
            ip: self.ip.to_string(),
            port: self.port,
        }
    }
}
