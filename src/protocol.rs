//! Completion protocol
//!
//! Defines the single wire artifact of a run, the [`CompletionMessage`], and the
//! framing used when walkers and the coordinator live in separate processes.
//!
//! # Message Flow
//!
//! ```text
//! Walker (rank r)                  Coordinator (rank 0)
//!     |                              |
//!     |-------- REGISTER(r) -------->|  (on connect)
//!     |                              |
//!     |  ... walk until stop ...     |  receive_from_any()
//!     |                              |
//!     |---- COMPLETION(r, steps) --->|
//!     |                              |  (repeat until N received)
//!     |<--------- FINALIZE ----------|
//! ```
//!
//! REGISTER binds the connection to a rank. The coordinator attributes the
//! completion to that rank, not to the `source_id` inside the message, so a
//! walker that misreports its id is caught as a source mismatch.
//!
//! The termination cause is not part of the message. It is reported locally by
//! the walker and the coordinator does not need it to count completions.
//!
//! # Message Framing
//!
//! Each message is MessagePack-encoded and prefixed with a 4-byte length field
//! (little-endian u32):
//!
//! ```text
//! [4 bytes: message length][N bytes: MessagePack message]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Protocol version
///
/// Bump when the wire format changes.
pub const PROTOCOL_VERSION: u32 = 1;

/// Largest frame accepted from the network
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Completion report sent exactly once by every walker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionMessage {
    /// Rank of the walker that produced the message
    pub source_id: u32,

    /// Number of steps the walk took before stopping
    pub steps_taken: u64,
}

impl CompletionMessage {
    pub fn new(source_id: u32, steps_taken: u64) -> Self {
        Self {
            source_id,
            steps_taken,
        }
    }
}

/// Protocol message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Connection handshake (Walker → Coordinator)
    Register { rank: u32 },

    /// Completion report (Walker → Coordinator)
    Completion(CompletionMessage),

    /// Joint shutdown (Coordinator → Walker)
    ///
    /// Sent once every expected completion is accounted for. Walkers exit after
    /// receiving it.
    Finalize,
}

/// Serialize a message with its length prefix
pub fn serialize_message(msg: &Message) -> Result<Vec<u8>, TransportError> {
    let body = rmp_serde::to_vec(msg).map_err(|e| TransportError::Codec(e.to_string()))?;

    let mut framed = Vec::with_capacity(4 + body.len());
    framed.extend_from_slice(&(body.len() as u32).to_le_bytes());
    framed.extend_from_slice(&body);

    Ok(framed)
}

/// Deserialize one framed message from the front of `buf`
///
/// Returns `(message, bytes_consumed)` where `bytes_consumed` includes the prefix.
pub fn deserialize_message(buf: &[u8]) -> Result<(Message, usize), TransportError> {
    if buf.len() < 4 {
        return Err(TransportError::Codec(format!(
            "buffer too small for frame length (need 4 bytes, got {})",
            buf.len()
        )));
    }

    let len = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    if buf.len() < 4 + len {
        return Err(TransportError::Codec(format!(
            "incomplete frame (need {} bytes, got {})",
            4 + len,
            buf.len()
        )));
    }

    let msg = rmp_serde::from_slice(&buf[4..4 + len])
        .map_err(|e| TransportError::Codec(e.to_string()))?;

    Ok((msg, 4 + len))
}

/// Read one framed message from an async stream
pub async fn read_message<R>(reader: &mut R) -> Result<Message, TransportError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    read_message_or_eof(reader)
        .await?
        .ok_or_else(|| TransportError::Io(std::io::ErrorKind::UnexpectedEof.into()))
}

/// Read one framed message, or `None` if the stream ends cleanly before a frame starts
///
/// End of stream inside a frame is still an error.
pub async fn read_message_or_eof<R>(reader: &mut R) -> Result<Option<Message>, TransportError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    use tokio::io::AsyncReadExt;

    let mut len_buf = [0u8; 4];
    let first = reader.read(&mut len_buf).await?;
    if first == 0 {
        return Ok(None);
    }
    reader.read_exact(&mut len_buf[first..]).await?;

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(TransportError::Codec(format!(
            "frame too large: {} bytes (max {})",
            len, MAX_FRAME_LEN
        )));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;

    rmp_serde::from_slice(&body)
        .map(Some)
        .map_err(|e| TransportError::Codec(e.to_string()))
}

/// Write one framed message to an async stream and flush it
pub async fn write_message<W>(writer: &mut W, msg: &Message) -> Result<(), TransportError>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    use tokio::io::AsyncWriteExt;

    let framed = serialize_message(msg)?;
    writer.write_all(&framed).await?;
    writer.flush().await?;

    Ok(())
}
