//! Broker TCP listener
//!
//! Binds with the configured backlog and accepts connections forever.
//! Each accepted socket is handed to its own task immediately so the
//! accept loop never blocks on per-connection work.

use crate::config::ListenerSettings;
use crate::error::Result;
use crate::net::connection::handle_connection;
use crate::net::router::MessageRouter;
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket};
use tracing::{info, warn};

pub struct BrokerListener {
    listener: TcpListener,
    router: Arc<MessageRouter>,
    max_frame_bytes: usize,
}

impl BrokerListener {
    /// Bind the listen socket. Failure here is fatal to startup.
    pub async fn bind(settings: &ListenerSettings, router: Arc<MessageRouter>) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", settings.bind_addr, settings.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid listen address {}:{}",
                    settings.bind_addr, settings.port
                )
            })?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket
            .bind(addr)
            .with_context(|| format!("Failed to bind listen address {}", addr))?;
        let listener = socket.listen(settings.backlog)?;

        info!("Broker listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            router,
            max_frame_bytes: settings.max_frame_bytes,
        })
    }

    /// Actual bound address, useful when the configured port is 0
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the task is aborted.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((socket, addr)) => {
                    let router = self.router.clone();
                    let max_frame_bytes = self.max_frame_bytes;
                    tokio::spawn(async move {
                        handle_connection(socket, addr, router, max_frame_bytes).await;
                    });
                }
                Err(e) => {
                    // Transient accept failures (fd pressure and the like)
                    // must not take the broker down.
                    warn!("Failed to accept connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }
}
