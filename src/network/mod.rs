//! Network Module
//!
//! TCP connection handling for the client.
//!
//! ## Lifecycle
//! - One connection per invocation, never reused
//! - Opened immediately before the send
//! - Closed after the send (notification) or the receive (call)

mod connection;

pub use connection::Connection;
