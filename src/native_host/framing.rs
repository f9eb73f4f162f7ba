//! Native messaging framing
//!
//! Each message is a 32-bit length in native byte order followed by that
//! many bytes of UTF-8 JSON.

use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest message the browser may send to the host: 64MiB
pub const MAX_INBOUND_MESSAGE_BYTES: usize = 64 * 1024 * 1024;

/// Largest message the browser accepts from the host: 1MiB
pub const MAX_OUTBOUND_MESSAGE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum FramingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("message of {len} bytes exceeds the {limit} byte limit")]
    TooLarge { len: usize, limit: usize },

    #[error("stream ended inside a message header")]
    TruncatedHeader,

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Read one message body; `None` on a clean end of stream
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, FramingError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(FramingError::TruncatedHeader);
        }
        filled += n;
    }

    let len = u32::from_ne_bytes(header) as usize;
    if len > MAX_INBOUND_MESSAGE_BYTES {
        return Err(FramingError::TooLarge {
            len,
            limit: MAX_INBOUND_MESSAGE_BYTES,
        });
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}

/// Serialize `message` and write it as one frame
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<(), FramingError>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(message)?;
    if body.len() > MAX_OUTBOUND_MESSAGE_BYTES {
        return Err(FramingError::TooLarge {
            len: body.len(),
            limit: MAX_OUTBOUND_MESSAGE_BYTES,
        });
    }

    // fits: bounded by MAX_OUTBOUND_MESSAGE_BYTES
    let len = body.len() as u32;
    writer.write_all(&len.to_ne_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}
