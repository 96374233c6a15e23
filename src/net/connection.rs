//! Per-connection receive/send loops
//!
//! Each accepted socket gets one task running [`handle_connection`]. The
//! read side performs one framed receive at a time, decodes, dispatches,
//! and queues the reply on the client's channel; a separate writer task
//! drains that channel so send completion never blocks request handling.

use crate::error::BrokerError;
use crate::net::router::MessageRouter;
use crate::protocol::{codec, ClientPayload, ServerPayload};
use crate::types::ClientHandle;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Serve one client connection until it disconnects or the stream
/// desynchronizes. Malformed payloads are logged and skipped; the
/// connection stays open and keeps receiving.
pub async fn handle_connection(
    socket: TcpStream,
    addr: SocketAddr,
    router: Arc<MessageRouter>,
    max_frame_bytes: usize,
) {
    let (mut read_half, write_half) = socket.into_split();
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = ClientHandle::new(addr, tx);

    info!("Client connected: {} (id {})", addr, handle.id());

    // Writer task: owns the write half, drains queued replies.
    tokio::spawn(write_loop(write_half, rx, addr, max_frame_bytes));

    loop {
        let body = match codec::read_frame(&mut read_half, max_frame_bytes).await {
            Ok(Some(body)) => body,
            Ok(None) => {
                info!("Client disconnected: {}", addr);
                break;
            }
            Err(e) => {
                // Oversized prefix, truncated frame, or transport error:
                // the stream cannot be resynchronized past this point.
                warn!("Closing connection to {}: {}", addr, e);
                break;
            }
        };

        let payload = match codec::decode_payload::<ClientPayload>(&body) {
            Ok(payload) => payload,
            Err(e) => {
                let message = match e.downcast_ref::<BrokerError>() {
                    Some(BrokerError::MalformedPayload { message }) => message.clone(),
                    _ => e.to_string(),
                };
                warn!(
                    "Dropping unrecognized payload from {} ({} bytes): {}",
                    addr,
                    body.len(),
                    message
                );
                continue;
            }
        };

        debug!("Received {} from {}", payload.kind(), addr);
        let reply = router.dispatch(payload, &handle).await;
        handle.send(reply);
    }
}

/// Drain queued payloads to the socket, fire-and-forget. Ends when every
/// sender is gone or a write fails (peer hung up).
async fn write_loop(
    mut write_half: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<ServerPayload>,
    addr: SocketAddr,
    max_frame_bytes: usize,
) {
    while let Some(payload) = rx.recv().await {
        let frame = match codec::encode_payload(&payload, max_frame_bytes) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to encode reply for {}: {}", addr, e);
                continue;
            }
        };

        if let Err(e) = codec::write_frame(&mut write_half, &frame).await {
            debug!("Write to {} failed, stopping writer: {}", addr, e);
            break;
        }
    }
}
