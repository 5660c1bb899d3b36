//! Protocol codec
//!
//! Encoding and decoding of envelopes, and framing on a byte stream.
//!
//! ## Framing
//!
//! The text format carries no length prefix, so a response is read in
//! `chunk_size` pieces until the buffer holds a complete document (see
//! [`document_end`]) or the server closes its side. Anything after the
//! document is ignored. The buffer is bounded by `max_size`; a larger
//! response is rejected rather than truncated.

use std::io::{ErrorKind, Read, Write};

use bytes::BytesMut;

use crate::error::{KvRpcError, Result};
use crate::keyvalues::{self, document_end};
use super::{CallFrame, ResponseFrame};

// =============================================================================
// Envelope Encoding/Decoding
// =============================================================================

/// Encode a call frame as envelope text
pub fn encode_envelope(frame: &CallFrame) -> Vec<u8> {
    keyvalues::to_string(&frame.to_envelope()).into_bytes()
}

/// Decode response envelope text into a response frame
pub fn decode_envelope(bytes: &[u8]) -> Result<ResponseFrame> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| KvRpcError::Decode(format!("response is not valid UTF-8: {}", e)))?;
    let envelope = keyvalues::parse(text)?;
    ResponseFrame::from_envelope(envelope)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a call frame to a stream
pub fn write_frame<W: Write>(writer: &mut W, frame: &CallFrame) -> Result<()> {
    let bytes = encode_envelope(frame);
    tracing::trace!(bytes = bytes.len(), method = %frame.method, "Sending envelope");
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response frame from a stream
///
/// Blocks until a whole envelope is assembled, the peer closes, or the
/// reader fails (including read timeouts).
pub fn read_frame<R: Read>(reader: &mut R, chunk_size: usize, max_size: usize) -> Result<ResponseFrame> {
    let mut buf = BytesMut::with_capacity(chunk_size);
    let mut chunk = vec![0u8; chunk_size.max(1)];

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        if n == 0 {
            if buf.is_empty() {
                return Err(KvRpcError::ConnectionClosed);
            }
            tracing::trace!(bytes = buf.len(), "Peer closed, decoding what was received");
            return decode_envelope(&buf);
        }

        buf.extend_from_slice(&chunk[..n]);

        // Only the envelope counts towards the limit, not bytes trailing it
        if let Some(end) = document_end(&buf) {
            if end > max_size {
                return Err(too_large(max_size));
            }
            tracing::trace!(bytes = end, "Received complete envelope");
            return decode_envelope(&buf[..end]);
        }

        if buf.len() > max_size {
            return Err(too_large(max_size));
        }
    }
}

fn too_large(max_size: usize) -> KvRpcError {
    KvRpcError::Decode(format!("response too large: more than {} bytes", max_size))
}
