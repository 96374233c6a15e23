//! Common types used throughout the lobby broker

use crate::protocol::ServerPayload;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Unique identifier for lobbies (the client-chosen name)
pub type LobbyName = String;

/// Unique identifier for connected clients
pub type ClientId = Uuid;

/// Handle to a connected client's outbound transport.
///
/// Cloneable so the registry can keep one per lobby member while the
/// originating connection task keeps its own. Sends are fire-and-forget:
/// the connection's writer task drains the channel independently of
/// request processing.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    id: ClientId,
    addr: SocketAddr,
    sender: mpsc::UnboundedSender<ServerPayload>,
}

impl ClientHandle {
    pub fn new(addr: SocketAddr, sender: mpsc::UnboundedSender<ServerPayload>) -> Self {
        Self {
            id: Uuid::new_v4(),
            addr,
            sender,
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Queue a payload for delivery to this client.
    ///
    /// A closed channel means the client disconnected; membership is
    /// append-only, so the stale handle stays in the lobby and the send
    /// is simply dropped.
    pub fn send(&self, payload: ServerPayload) {
        if self.sender.send(payload).is_err() {
            debug!(
                "Dropping payload for disconnected client {} ({})",
                self.id, self.addr
            );
        }
    }
}
