//! Length-prefixed binary framing
//!
//! Each frame is a `u32` little-endian payload length followed by the
//! bincode-encoded payload. Explicit framing means message boundaries no
//! longer depend on receive-buffer boundaries; a partial TCP read simply
//! leaves the reader waiting for the rest of the frame.

use crate::error::{BrokerError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the length prefix in bytes
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// Default upper bound on payload size
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024;

/// Encode a payload into a complete frame (prefix + body).
pub fn encode_payload<T: Serialize>(payload: &T, max_frame_bytes: usize) -> Result<Vec<u8>> {
    let body = bincode::serialize(payload).map_err(|e| BrokerError::MalformedPayload {
        message: e.to_string(),
    })?;

    if body.len() > max_frame_bytes {
        return Err(BrokerError::FrameTooLarge {
            len: body.len(),
            max: max_frame_bytes,
        }
        .into());
    }

    let mut frame = Vec::with_capacity(LENGTH_PREFIX_BYTES + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_le_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decode a frame body into a payload.
///
/// Failure here means the frame was well delimited but its bytes do not
/// form a known payload. Callers log and keep the connection open.
pub fn decode_payload<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    bincode::deserialize(body).map_err(|e| {
        BrokerError::MalformedPayload {
            message: e.to_string(),
        }
        .into()
    })
}

/// Read one frame body from the stream.
///
/// Returns `Ok(None)` on a clean EOF at a frame boundary (client hung up).
/// EOF in the middle of a frame, or a length prefix above the configured
/// bound, is an error; the stream cannot be resynchronized past either.
pub async fn read_frame<R>(reader: &mut R, max_frame_bytes: usize) -> Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_BYTES];
    match reader.read_exact(&mut prefix).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_le_bytes(prefix) as usize;
    if len > max_frame_bytes {
        return Err(BrokerError::FrameTooLarge {
            len,
            max: max_frame_bytes,
        }
        .into());
    }

    let mut body = vec![0u8; len];
    reader
        .read_exact(&mut body)
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => {
                anyhow::Error::from(BrokerError::TruncatedFrame { expected: len })
            }
            _ => e.into(),
        })?;

    Ok(Some(body))
}

/// Write one pre-encoded frame to the stream.
pub async fn write_frame<W>(writer: &mut W, frame: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(frame).await?;
    writer.flush().await?;
    Ok(())
}
