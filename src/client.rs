//! Client Module
//!
//! The RPC client: turns a method name and named parameters into one
//! request/response exchange over a fresh connection.
//!
//! ## Call Sequence
//! 1. Build the call frame (version, method, id, params)
//! 2. Open a connection to the configured server
//! 3. Send the encoded envelope
//! 4. Calls only: read the response envelope and resolve `error` / `result`
//! 5. Close the connection, whatever happened above

use crate::config::ClientConfig;
use crate::error::{KvRpcError, Result};
use crate::keyvalues::KeyValues;
use crate::network::Connection;
use crate::protocol::CallFrame;

/// KeyValues RPC client
///
/// Holds only read-only configuration, so one client can be shared across
/// threads; each invocation opens and owns its own connection.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    /// Create a client from a configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a client for `addr` with default settings
    pub fn connect_to(addr: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::builder().server_addr(addr).build())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Call a remote method and wait for its result
    ///
    /// Returns `Ok(None)` when the method returned nothing meaningful, and
    /// `Err(KvRpcError::Rpc { .. })` when the server reported a failure.
    pub fn call(&self, method: &str, params: KeyValues) -> Result<Option<KeyValues>> {
        self.call_with_id(method, params, self.config.request_id.as_str())
    }

    /// Call a remote method with a caller-chosen request id
    pub fn call_with_id(
        &self,
        method: &str,
        params: KeyValues,
        id: impl Into<String>,
    ) -> Result<Option<KeyValues>> {
        check_method(method)?;
        let frame = CallFrame::call(method, params, id);

        let mut conn = Connection::open(&self.config)?;
        tracing::debug!(method, peer = conn.peer_addr(), "Calling");

        let outcome = conn
            .send(&frame)
            .and_then(|_| conn.receive())
            .and_then(|response| response.into_result());
        conn.close();

        match &outcome {
            Ok(Some(result)) => tracing::debug!(method, fields = result.len(), "Call returned"),
            Ok(None) => tracing::debug!(method, "Call returned no result"),
            Err(KvRpcError::Rpc { message, code }) => {
                tracing::debug!(method, code = %code, "Call failed remotely: {}", message)
            }
            Err(e) => tracing::warn!(method, "Call failed: {}", e),
        }

        outcome
    }

    /// Send a notification; no response is expected or read
    ///
    /// Only local failures (connect, send) are reported.
    pub fn notify(&self, method: &str, params: KeyValues) -> Result<()> {
        check_method(method)?;
        let frame = CallFrame::notification(method, params);

        let mut conn = Connection::open(&self.config)?;
        tracing::debug!(method, peer = conn.peer_addr(), "Notifying");

        let outcome = conn.send(&frame);
        conn.close();

        if let Err(e) = &outcome {
            tracing::warn!(method, "Notification failed: {}", e);
        }
        outcome
    }
}

fn check_method(method: &str) -> Result<()> {
    if method.trim().is_empty() {
        return Err(KvRpcError::InvalidRequest(
            "method name must not be empty".to_string(),
        ));
    }
    Ok(())
}
