//! Main application state and service coordination
//!
//! This module contains the production AppState that wires the launcher,
//! registry, router, and listener together and owns the listener task.

use crate::config::AppConfig;
use crate::launcher::ProcessLauncher;
use crate::net::{BrokerListener, MessageRouter};
use crate::registry::{LobbyRegistry, RegistryStats};
use crate::utils::local_ipv4;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Listener error: {message}")]
    Listener { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// The authoritative lobby/server registry
    registry: Arc<LobbyRegistry>,

    /// Router shared by every connection task
    router: Arc<MessageRouter>,

    /// Address the listener actually bound, once started
    bound_addr: Option<SocketAddr>,

    /// Accept-loop task handle
    listener_task: Option<JoinHandle<()>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,
}

impl AppState {
    /// Initialize the application with all dependencies
    pub fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing lobby broker service");

        let advertise_ip: IpAddr = match config.game_server.advertise_ip {
            Some(ip) => ip,
            None => {
                let ip = local_ipv4();
                info!("No advertise IP configured, discovered {}", ip);
                ip
            }
        };

        let launcher = Arc::new(ProcessLauncher::new(config.game_server.build_path.clone()));
        let registry = Arc::new(LobbyRegistry::new(
            launcher,
            advertise_ip,
            config.game_server.base_port,
        ));
        let router = Arc::new(MessageRouter::new(registry.clone()));

        Ok(Self {
            config,
            registry,
            router,
            bound_addr: None,
            listener_task: None,
            is_running: Arc::new(RwLock::new(false)),
        })
    }

    /// Bind the listener and start accepting clients
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        info!("Starting lobby broker service");

        let listener = BrokerListener::bind(&self.config.listener, self.router.clone())
            .await
            .map_err(|e| ServiceError::Listener {
                message: e.to_string(),
            })?;

        self.bound_addr = Some(listener.local_addr().map_err(|e| ServiceError::Listener {
            message: e.to_string(),
        })?);

        self.listener_task = Some(tokio::spawn(listener.run()));
        *self.is_running.write().await = true;

        info!("Lobby broker service started successfully");
        Ok(())
    }

    /// Stop accepting connections. Existing game server processes stay
    /// alive; the broker never owns their lifecycle.
    pub async fn shutdown(&mut self) {
        info!("Stopping lobby broker service");
        *self.is_running.write().await = false;

        if let Some(task) = self.listener_task.take() {
            task.abort();
        } else {
            warn!("Shutdown requested but the listener was never started");
        }

        let stats = self.registry.stats();
        info!(
            "Final registry stats: {} lobbies created, {} joins, {} rejected creates",
            stats.lobbies_created, stats.joins_accepted, stats.creates_rejected
        );
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Address the listener bound, available after `start`
    pub fn bound_addr(&self) -> Option<SocketAddr> {
        self.bound_addr
    }

    pub fn registry(&self) -> &Arc<LobbyRegistry> {
        &self.registry
    }

    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let mut config = AppConfig::default();
        config.listener.bind_addr = "127.0.0.1".to_string();
        config.listener.port = 0; // ephemeral, avoids collisions

        let mut app = AppState::new(config).unwrap();
        assert!(!app.is_running().await);

        assert_ok!(app.start().await);
        assert!(app.is_running().await);
        assert!(app.bound_addr().is_some());

        app.shutdown().await;
        assert!(!app.is_running().await);
    }

    #[tokio::test]
    async fn test_start_fails_on_unparseable_bind_addr() {
        let mut config = AppConfig::default();
        config.listener.bind_addr = "not-an-address".to_string();

        let mut app = AppState::new(config).unwrap();
        let err = app.start().await.unwrap_err();
        assert!(matches!(err, ServiceError::Listener { .. }));
    }
}
