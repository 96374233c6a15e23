//! Main application configuration
//!
//! This module defines the primary configuration structures for the lobby
//! broker, including JSON file persistence, environment variable loading,
//! and validation.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::protocol::codec::DEFAULT_MAX_FRAME_BYTES;

/// Default path of the persisted configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub listener: ListenerSettings,
    pub game_server: GameServerSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// TCP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerSettings {
    /// Address to bind the broker listener on
    pub bind_addr: String,
    /// Port clients dial to reach the broker
    pub port: u16,
    /// Listen backlog
    pub backlog: u32,
    /// Upper bound on a single frame payload in bytes
    pub max_frame_bytes: usize,
}

/// Game server process settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameServerSettings {
    /// Path to the game server build to spawn per lobby
    pub build_path: PathBuf,
    /// First port handed to a spawned game server; later lobbies count up
    pub base_port: u16,
    /// IP advertised to clients in LobbyInfo replies. When absent the
    /// broker discovers the local interface address at startup.
    pub advertise_ip: Option<IpAddr>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceSettings::default(),
            listener: ListenerSettings::default(),
            game_server: GameServerSettings::default(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "lobby-broker".to_string(),
            log_level: "info".to_string(),
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 3000,
            backlog: 10,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl Default for GameServerSettings {
    fn default() -> Self {
        Self {
            build_path: PathBuf::from("./game-server"),
            base_port: 3001,
            advertise_ip: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            config.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Listener settings
        if let Ok(addr) = env::var("LISTEN_ADDR") {
            config.listener.bind_addr = addr;
        }
        if let Ok(port) = env::var("LISTEN_PORT") {
            config.listener.port = port
                .parse()
                .map_err(|_| anyhow!("Invalid LISTEN_PORT value: {}", port))?;
        }
        if let Ok(backlog) = env::var("LISTEN_BACKLOG") {
            config.listener.backlog = backlog
                .parse()
                .map_err(|_| anyhow!("Invalid LISTEN_BACKLOG value: {}", backlog))?;
        }
        if let Ok(max_frame) = env::var("MAX_FRAME_BYTES") {
            config.listener.max_frame_bytes = max_frame
                .parse()
                .map_err(|_| anyhow!("Invalid MAX_FRAME_BYTES value: {}", max_frame))?;
        }

        // Game server settings
        if let Ok(path) = env::var("GAME_SERVER_BUILD_PATH") {
            config.game_server.build_path = PathBuf::from(path);
        }
        if let Ok(base_port) = env::var("GAME_SERVER_BASE_PORT") {
            config.game_server.base_port = base_port
                .parse()
                .map_err(|_| anyhow!("Invalid GAME_SERVER_BASE_PORT value: {}", base_port))?;
        }
        if let Ok(ip) = env::var("ADVERTISE_IP") {
            config.game_server.advertise_ip = Some(
                ip.parse()
                    .map_err(|_| anyhow!("Invalid ADVERTISE_IP value: {}", ip))?,
            );
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a persisted JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Load the persisted config, writing defaults first if the file is
    /// missing. An unreadable or invalid existing file is an error; a new
    /// deployment gets a default file it can then edit.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            let config = Self::default();
            config.write_file(path)?;
            Ok(config)
        }
    }

    /// Persist this configuration as JSON
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate ports
    if config.listener.port == 0 {
        return Err(anyhow!("Listen port cannot be 0"));
    }
    if config.game_server.base_port == 0 {
        return Err(anyhow!("Game server base port cannot be 0"));
    }

    // Validate listener bounds
    if config.listener.backlog == 0 {
        return Err(anyhow!("Listen backlog must be greater than 0"));
    }
    if config.listener.max_frame_bytes == 0 {
        return Err(anyhow!("Max frame size must be greater than 0"));
    }
    if config.listener.bind_addr.is_empty() {
        return Err(anyhow!("Bind address cannot be empty"));
    }

    // Validate game server settings
    if config.game_server.build_path.as_os_str().is_empty() {
        return Err(anyhow!("Game server build path cannot be empty"));
    }

    // Validate timeouts
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }

    Ok(())
}
