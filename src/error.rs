//! Error types for kvrpc
//!
//! One error enum covers every failure category a call can surface.
//! Callers that only care about remote-side failures match on
//! [`KvRpcError::Rpc`]; everything else is local (transport or decode).

use thiserror::Error;

/// Result type alias using KvRpcError
pub type Result<T> = std::result::Result<T, KvRpcError>;

/// Unified error type for kvrpc operations
#[derive(Debug, Error)]
pub enum KvRpcError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed by server before a response was received")]
    ConnectionClosed,

    // -------------------------------------------------------------------------
    // Decode Errors
    // -------------------------------------------------------------------------
    #[error("Decode error: {0}")]
    Decode(String),

    // -------------------------------------------------------------------------
    // Remote Errors
    // -------------------------------------------------------------------------
    #[error("RPC error {code}: {message}")]
    Rpc { message: String, code: String },

    // -------------------------------------------------------------------------
    // Local Usage Errors
    // -------------------------------------------------------------------------
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl KvRpcError {
    /// Connection could not be opened, or the byte stream failed
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            KvRpcError::Connect { .. } | KvRpcError::Io(_) | KvRpcError::ConnectionClosed
        )
    }

    /// Received bytes were not a well-formed response envelope
    pub fn is_decode(&self) -> bool {
        matches!(self, KvRpcError::Decode(_))
    }

    /// The server answered with an `error` frame
    pub fn is_rpc(&self) -> bool {
        matches!(self, KvRpcError::Rpc { .. })
    }

    /// Numeric form of an RPC error code, if the server sent one
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            KvRpcError::Rpc { code, .. } => code.trim().parse().ok(),
            _ => None,
        }
    }
}
