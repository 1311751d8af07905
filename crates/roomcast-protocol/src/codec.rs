//! Frame codec: inbound dispatch and outbound encoding.
//!
//! Inbound frames are decoded in two steps. First the outer
//! [`ServerEnvelope`] gives the opcode; then the `result` payload is
//! decoded into the shape that opcode demands. Frames with opcodes this
//! client does not know are surfaced as [`InboundFrame::Unknown`] rather
//! than errors, so newer server versions can add opcodes freely.

use serde::Serialize;

use crate::error::ProtocolError;
use crate::types::{
    ClientEnvelope, ObjectDelta, Operation, ServerEnvelope, TextDelta,
    WelcomeResult, OP_CLIENT_WELCOME, OP_OBJECT, OP_TEXT,
};

/// A decoded inbound frame, dispatched by opcode.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// The session handshake carrying the authoritative identifier.
    Welcome(WelcomeResult),
    /// A normalized key-addressed delta (from either wire variant).
    Delta(Operation),
    /// An opcode this client does not interpret. Carries the opcode for
    /// logging; the result payload is discarded undecoded.
    Unknown(String),
}

/// Decodes one inbound frame.
///
/// # Errors
/// Returns [`ProtocolError::Decode`] when the outer envelope is malformed,
/// or when the result payload of a *known* opcode does not match its shape.
/// Unknown opcodes never error.
pub fn decode_frame(frame: &str) -> Result<InboundFrame, ProtocolError> {
    let envelope: ServerEnvelope =
        serde_json::from_str(frame).map_err(ProtocolError::Decode)?;

    match envelope.op_code.as_str() {
        OP_CLIENT_WELCOME => {
            let welcome: WelcomeResult =
                serde_json::from_value(envelope.result)
                    .map_err(ProtocolError::Decode)?;
            Ok(InboundFrame::Welcome(welcome))
        }
        OP_TEXT => {
            let delta: TextDelta =
                serde_json::from_value(envelope.result)
                    .map_err(ProtocolError::Decode)?;
            // The text variant's value is doubly encoded; parse it here so
            // the rest of the client never sees the difference.
            let value = serde_json::from_str(&delta.value)
                .map_err(ProtocolError::Decode)?;
            Ok(InboundFrame::Delta(Operation {
                key: delta.key,
                value,
            }))
        }
        OP_OBJECT => {
            let delta: ObjectDelta =
                serde_json::from_value(envelope.result)
                    .map_err(ProtocolError::Decode)?;
            Ok(InboundFrame::Delta(Operation {
                key: delta.key,
                value: delta.value,
            }))
        }
        _ => Ok(InboundFrame::Unknown(envelope.op_code)),
    }
}

/// Encodes one outbound frame with the given sequence number.
///
/// # Errors
/// Returns [`ProtocolError::Encode`] if `params` cannot be serialized.
pub fn encode_frame<T: Serialize>(
    seq: u64,
    op_code: &str,
    params: &T,
) -> Result<String, ProtocolError> {
    let envelope = ClientEnvelope {
        seq,
        op_code: op_code.to_owned(),
        params,
    };
    serde_json::to_string(&envelope).map_err(ProtocolError::Encode)
}
