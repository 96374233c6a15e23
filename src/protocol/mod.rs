//! Wire protocol for the lobby broker
//!
//! This module defines the envelope payload types exchanged with clients
//! and the length-prefixed binary framing used to carry them over TCP.

pub mod codec;
pub mod messages;

// Re-export commonly used types
pub use codec::{
    decode_payload, encode_payload, read_frame, write_frame, DEFAULT_MAX_FRAME_BYTES,
};
pub use messages::{ClientPayload, ServerPayload};
