//! Frame definitions
//!
//! Call frames sent to the server and response frames read back.

use crate::error::{KvRpcError, Result};
use crate::keyvalues::{KeyValues, Value};
use super::{PROTOCOL_TAG, RPC_VERSION};

/// A request body: method name, optional id and named parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CallFrame {
    /// Remote method to invoke
    pub method: String,

    /// Request identifier; `None` marks a notification
    pub id: Option<String>,

    /// Named arguments
    pub params: KeyValues,
}

impl CallFrame {
    /// Create a call frame (a response is expected)
    pub fn call(method: impl Into<String>, params: KeyValues, id: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            id: Some(id.into()),
            params,
        }
    }

    /// Create a notification frame (no id, no response)
    pub fn notification(method: impl Into<String>, params: KeyValues) -> Self {
        Self {
            method: method.into(),
            id: None,
            params,
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Wrap the frame in an envelope under the protocol tag
    pub fn to_envelope(&self) -> KeyValues {
        let mut frame = KeyValues::new();
        frame.insert("rpc_version", RPC_VERSION);
        frame.insert("method", self.method.as_str());
        if let Some(id) = &self.id {
            frame.insert("id", id.as_str());
        }
        frame.insert("params", self.params.clone());

        let mut envelope = KeyValues::new();
        envelope.insert(PROTOCOL_TAG, frame);
        envelope
    }

    /// Read a call frame back out of an envelope
    pub fn from_envelope(envelope: KeyValues) -> Result<Self> {
        let mut frame = unwrap_envelope(envelope)?;

        match frame.get_str("rpc_version") {
            Some(RPC_VERSION) => {}
            Some(other) => {
                return Err(KvRpcError::Decode(format!(
                    "unsupported rpc_version \"{}\"",
                    other
                )))
            }
            None => return Err(KvRpcError::Decode("call frame has no rpc_version".to_string())),
        }

        let method = match frame.remove("method") {
            Some(Value::String(m)) if !m.is_empty() => m,
            _ => return Err(KvRpcError::Decode("call frame has no method".to_string())),
        };

        let id = frame.remove("id").and_then(|v| v.leaf_text());

        let params = match frame.remove("params") {
            Some(Value::Map(p)) => p,
            Some(v) if v.is_empty() => KeyValues::new(),
            None => KeyValues::new(),
            Some(_) => return Err(KvRpcError::Decode("params is not a mapping".to_string())),
        };

        Ok(Self { method, id, params })
    }
}

/// Failure details reported by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcErrorBody {
    /// Human-readable description
    pub message: String,

    /// Identifier classifying the failure (usually numeric)
    pub code: String,
}

impl RpcErrorBody {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }

    /// Numeric form of the code, if it has one
    pub fn code_as_i64(&self) -> Option<i64> {
        self.code.trim().parse().ok()
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Map(m) if !m.is_empty() => Some(Self {
                message: m
                    .get("message")
                    .and_then(Value::leaf_text)
                    .unwrap_or_else(|| "unknown error".to_string()),
                code: m.get("code").and_then(Value::leaf_text).unwrap_or_default(),
            }),
            Value::String(s) if !s.is_empty() => Some(Self::new(s, "")),
            Value::Int(n) => Some(Self::new("unknown error", n.to_string())),
            _ => None,
        }
    }
}

impl From<RpcErrorBody> for KvRpcError {
    fn from(body: RpcErrorBody) -> Self {
        KvRpcError::Rpc {
            message: body.message,
            code: body.code,
        }
    }
}

/// A response body: either a result or an error
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseFrame {
    /// Method return value (absent or empty = nothing meaningful)
    pub result: Option<KeyValues>,

    /// Populated when the remote method failed
    pub error: Option<RpcErrorBody>,
}

impl ResponseFrame {
    /// Create a success frame
    pub fn success(result: KeyValues) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    /// Create a failure frame
    pub fn failure(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(RpcErrorBody::new(message, code)),
        }
    }

    /// Extract the response frame from a decoded envelope
    ///
    /// A missing tag or a non-mapping frame is a decode error. Empty `result`
    /// and `error` fields are treated as absent.
    pub fn from_envelope(envelope: KeyValues) -> Result<Self> {
        let mut frame = unwrap_envelope(envelope)?;

        let error = frame.remove("error").and_then(RpcErrorBody::from_value);

        let result = match frame.remove("result") {
            Some(Value::Map(m)) if !m.is_empty() => Some(m),
            Some(v) if v.is_empty() => None,
            None => None,
            Some(_) if error.is_some() => None,
            Some(_) => return Err(KvRpcError::Decode("result is not a mapping".to_string())),
        };

        Ok(Self { result, error })
    }

    /// Wrap the frame in an envelope under the protocol tag
    pub fn to_envelope(&self) -> KeyValues {
        let mut frame = KeyValues::new();
        if let Some(result) = &self.result {
            frame.insert("result", result.clone());
        }
        if let Some(error) = &self.error {
            let mut body = KeyValues::new();
            body.insert("message", error.message.as_str());
            body.insert("code", error.code.as_str());
            frame.insert("error", body);
        }

        let mut envelope = KeyValues::new();
        envelope.insert(PROTOCOL_TAG, frame);
        envelope
    }

    /// Resolve the frame: an error wins, otherwise the (possibly absent) result
    pub fn into_result(self) -> Result<Option<KeyValues>> {
        if let Some(error) = self.error {
            return Err(error.into());
        }
        Ok(self.result.filter(|r| !r.is_empty()))
    }
}

fn unwrap_envelope(mut envelope: KeyValues) -> Result<KeyValues> {
    match envelope.remove(PROTOCOL_TAG) {
        Some(Value::Map(frame)) => Ok(frame),
        Some(_) => Err(KvRpcError::Decode(format!(
            "\"{}\" is not a mapping",
            PROTOCOL_TAG
        ))),
        None => Err(KvRpcError::Decode(format!(
            "envelope is missing the \"{}\" tag",
            PROTOCOL_TAG
        ))),
    }
}
