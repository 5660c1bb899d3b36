//! Protocol Module
//!
//! Defines the KeyValues RPC envelope exchanged with the server.
//!
//! ## Envelope Format
//!
//! Every message on the wire is one KeyValues document with a single root key:
//!
//! ```text
//! "keyvalues_rpc"
//! {
//!     "rpc_version"   "2.0"
//!     "method"        "<name>"
//!     "id"            "<id>"        (calls only)
//!     "params"        { ... }
//! }
//! ```
//!
//! ### Response Frame
//! - `result`: mapping returned by the method (absent or empty = no result)
//! - `error`:  `{ "message" "..." "code" "..." }` when the method failed
//!
//! ### Call vs Notification
//! The presence of `id` tells the server a response is expected. A
//! notification carries no `id` and is never answered.

mod frame;
mod codec;

pub use frame::{CallFrame, ResponseFrame, RpcErrorBody};
pub use codec::{decode_envelope, encode_envelope, read_frame, write_frame};

/// Root key of every envelope
pub const PROTOCOL_TAG: &str = "keyvalues_rpc";

/// Protocol version sent in every call frame
pub const RPC_VERSION: &str = "2.0";

/// Request identifier used when the caller does not choose one
pub const DEFAULT_REQUEST_ID: &str = "string_identifier";
