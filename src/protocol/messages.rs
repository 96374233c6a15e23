//! Protocol payload types
//!
//! One envelope carries exactly one payload; the enum variant is the
//! selector. Client payloads flow broker-ward, server payloads flow back.
//! Encoding is bincode behind the framing layer in [`crate::protocol::codec`].

use serde::{Deserialize, Serialize};

/// Payloads a client may send to the broker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientPayload {
    /// Create a lobby and spawn its game server.
    CreateLobby { lobby_name: String },
    /// Join an existing lobby.
    JoinLobby { lobby_name: String },
    /// List the names of all registered lobbies.
    GetLobbies,
}

/// Payloads the broker sends back to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerPayload {
    /// Endpoint of the game server backing a lobby. Returned to the
    /// creator on CreateLobby and verbatim to every later joiner.
    LobbyInfo { ip: String, port: u16 },
    /// Business or resource failure; the connection stays open.
    Error { message: String },
    /// Reply to GetLobbies. Order is registry iteration order and
    /// carries no meaning.
    LobbyList { lobby_names: Vec<String> },
}

impl ClientPayload {
    /// Variant name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ClientPayload::CreateLobby { .. } => "CreateLobby",
            ClientPayload::JoinLobby { .. } => "JoinLobby",
            ClientPayload::GetLobbies => "GetLobbies",
        }
    }
}
