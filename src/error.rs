//! Error types for the lobby broker
//!
//! This module defines all error types using anyhow for consistent error
//! handling throughout the application. The `Display` text of the business
//! variants is the exact message sent to clients in `Error` replies.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific broker scenarios
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// A CreateLobby named an already-registered lobby.
    #[error("Lobby name taken")]
    LobbyNameTaken { lobby_name: String },

    /// A JoinLobby named a lobby that was never created.
    #[error("Lobby does not exist")]
    LobbyNotFound { lobby_name: String },

    #[error("Failed to launch game server: {message}")]
    LaunchFailed { message: String },

    #[error("Game server port range exhausted")]
    PortsExhausted,

    #[error("Frame of {len} bytes exceeds limit of {max} bytes")]
    FrameTooLarge { len: usize, max: usize },

    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    #[error("Truncated frame: expected {expected} bytes")]
    TruncatedFrame { expected: usize },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal broker error: {message}")]
    InternalError { message: String },
}
