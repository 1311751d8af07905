/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Establishing the connection failed (DNS, TCP, or WS handshake).
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// The server did not accept the required subprotocol.
    #[error("subprotocol {expected:?} not negotiated (server offered {negotiated:?})")]
    SubprotocolRejected {
        expected: String,
        negotiated: Option<String>,
    },

    /// Sending a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// The connection was already closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),
}
