//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing an outbound frame failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// An inbound frame (or the result payload of a known opcode) did not
    /// match its expected shape.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
