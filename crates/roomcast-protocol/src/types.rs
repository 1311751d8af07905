//! Envelope and delta types for the Roomcast wire format.
//!
//! Every frame is a JSON object. Inbound frames share one outer shape
//! (`{"opCode": ..., "result": ...}`) whose `result` is decoded a second
//! time once the opcode is known. Outbound frames carry a per-session
//! sequence number (`{"seq": ..., "opCode": ..., "params": ...}`).

use serde::{Deserialize, Serialize};

/// Opcode of the server's welcome handshake. First frame of a session;
/// carries the authoritative participant identifier.
pub const OP_CLIENT_WELCOME: &str = "client/welcome";

/// Opcode for outbound addressed actions.
pub const OP_CLIENT_SEND: &str = "client/send";

/// Opcode of a delta whose value arrives as string-encoded JSON.
pub const OP_TEXT: &str = "text";

/// Opcode of a delta whose value arrives as an embedded JSON object.
pub const OP_OBJECT: &str = "object";

/// Fixed routing address of the sync service. Not caller-configurable.
pub const SERVICE_ADDRESS: u64 = 1;

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Outer shape of every inbound frame.
///
/// `result` stays opaque until the opcode has been dispatched; unknown
/// opcodes are ignored without ever looking at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerEnvelope {
    #[serde(rename = "opCode")]
    pub op_code: String,
    pub result: serde_json::Value,
}

/// Result payload of [`OP_CLIENT_WELCOME`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeResult {
    /// The authoritative participant identifier assigned by the service.
    pub id: String,
}

/// Result payload of [`OP_TEXT`]: the value is doubly encoded JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TextDelta {
    pub key: String,
    pub value: String,
}

/// Result payload of [`OP_OBJECT`]: the value is an embedded JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ObjectDelta {
    pub key: String,
    pub value: serde_json::Value,
}

/// A normalized key-addressed delta.
///
/// Both wire variants collapse into this shape at the codec boundary;
/// nothing downstream distinguishes a text delta from an object delta.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Path string identifying the target document.
    pub key: String,
    /// Full replacement value for that document.
    pub value: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Outer shape of every outbound frame.
///
/// `seq` is per-connection, starts at 1, and is strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientEnvelope<T> {
    pub seq: u64,
    #[serde(rename = "opCode")]
    pub op_code: String,
    pub params: T,
}

/// Addressed action payload used with [`OP_CLIENT_SEND`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSend<T> {
    /// The sender's authoritative identifier.
    pub from: String,
    /// Always [`SERVICE_ADDRESS`].
    pub to: u64,
    pub body: T,
}

impl<T> ClientSend<T> {
    /// Wraps `body` for delivery to the service from `from`.
    pub fn new(from: impl Into<String>, body: T) -> Self {
        Self {
            from: from.into(),
            to: SERVICE_ADDRESS,
            body,
        }
    }
}
