//! # kvrpc
//!
//! A minimal KeyValues RPC client:
//! - Requests and responses encoded as nested KeyValues text
//! - One blocking TCP connection per invocation
//! - Calls (with `id`, answered) and notifications (no `id`, never answered)
//! - Remote failures kept distinct from transport and decode failures
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Client::call / notify                       │
//! │              (method name + named params)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Protocol (CallFrame)                        │
//! │     "keyvalues_rpc" { rpc_version method id? params }        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  KeyValues  │          │ Connection  │
//!   │   (text)    │          │ (TCP, 1/op) │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │ResponseFrame│
//!                           │result/error │
//!                           └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use kvrpc::{params, Client};
//!
//! let client = Client::connect_to("127.0.0.1:27115")?;
//! let sum = client.call("add_my_numbers", params! { "a" => 1, "b" => 178 })?;
//! client.notify("log_line", params! { "text" => "hello" })?;
//! # Ok::<(), kvrpc::KvRpcError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod keyvalues;
pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvRpcError, Result};
pub use config::ClientConfig;
pub use client::Client;
pub use keyvalues::{KeyValues, Value};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvrpc
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
