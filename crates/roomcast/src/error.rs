//! Unified error type for the Roomcast client.

use roomcast_protocol::ProtocolError;
use roomcast_transport::TransportError;

/// Top-level error returned by [`RoomcastClient`](crate::RoomcastClient)
/// operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A transport-level error (dial, send, receive).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The configured host/room code do not form a valid connection URL.
    #[error("invalid connection target: {0}")]
    InvalidTarget(String),

    /// An addressed send was attempted before the welcome handshake
    /// assigned the authoritative identifier. Nothing was sent.
    #[error("authoritative identity not yet assigned; wait for welcome")]
    IdentityUnknown,

    /// A send was attempted while no session is open.
    #[error("no open session")]
    NotConnected,

    /// The client's single session has already been started. Sessions are
    /// not restartable; construct a new client to connect again.
    #[error("session already started; construct a new client")]
    AlreadyStarted,
}
