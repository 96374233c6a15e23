//! TCP front end of the lobby broker
//!
//! This module handles accepting client connections, running the
//! per-connection receive/send loops, and routing decoded payloads into
//! the lobby registry.

pub mod connection;
pub mod listener;
pub mod router;

// Re-export commonly used types
pub use listener::BrokerListener;
pub use router::MessageRouter;
