//! Configuration management for the lobby broker
//!
//! This module handles configuration loading from the persisted JSON file
//! and environment variables, validation, and default values.

pub mod app;

// Re-export commonly used types
pub use app::{
    validate_config, AppConfig, GameServerSettings, ListenerSettings, ServiceSettings,
    DEFAULT_CONFIG_PATH,
};
