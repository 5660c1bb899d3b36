//! KeyValues Module
//!
//! The nested key-value text format carried on the wire.
//!
//! ## Text Format
//!
//! ```text
//! "keyvalues_rpc"
//! {
//!     "rpc_version"   "2.0"
//!     "method"        "add_my_numbers"
//!     "params"
//!     {
//!         "a"     "1"
//!         "b"     "178"
//!     }
//! }
//! ```
//!
//! - Keys and leaf values are quoted strings (unquoted tokens are accepted on read)
//! - Nested mappings are `{ ... }` blocks following their key
//! - `//` starts a line comment; `[$CONDITION]` tags are accepted and ignored
//! - The format is weakly typed: integers are written as decimal strings and
//!   always read back as strings (see [`Value::as_i64`])

mod value;
mod writer;
mod parser;

pub use value::{KeyValues, Value};
pub use writer::to_string;
pub use parser::{document_complete, document_end, parse, MAX_DEPTH};
