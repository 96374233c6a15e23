//! Message routing
//!
//! Classifies a decoded client payload and invokes the matching registry
//! operation. The router holds no state of its own; business and resource
//! failures become `Error` replies and the connection stays open.

use crate::protocol::{ClientPayload, ServerPayload};
use crate::registry::LobbyRegistry;
use crate::types::ClientHandle;
use std::sync::Arc;
use tracing::debug;

pub struct MessageRouter {
    registry: Arc<LobbyRegistry>,
}

impl MessageRouter {
    pub fn new(registry: Arc<LobbyRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<LobbyRegistry> {
        &self.registry
    }

    /// Dispatch one payload on behalf of `requester` and produce the reply.
    pub async fn dispatch(
        &self,
        payload: ClientPayload,
        requester: &ClientHandle,
    ) -> ServerPayload {
        debug!(
            "Dispatching {} from client {} ({})",
            payload.kind(),
            requester.id(),
            requester.addr()
        );

        let result = match payload {
            ClientPayload::CreateLobby { lobby_name } => {
                self.registry
                    .create_lobby(&lobby_name, requester.clone())
                    .await
            }
            ClientPayload::JoinLobby { lobby_name } => {
                self.registry
                    .join_lobby(&lobby_name, requester.clone())
                    .await
            }
            ClientPayload::GetLobbies => Ok(self.registry.list_lobbies().await),
        };

        result.unwrap_or_else(|e| ServerPayload::Error {
            message: e.to_string(),
        })
    }
}
