//! Transport layer for the Roomcast client.
//!
//! Provides the [`Connection`] trait that abstracts the duplex socket a
//! session runs over, plus the [`ShutdownSignal`] primitive that releases
//! the blocking session call when the connection ends.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket connection via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
mod shutdown;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
pub use shutdown::ShutdownSignal;
#[cfg(feature = "websocket")]
pub use websocket::WsConnection;

/// A duplex connection carrying UTF-8 text frames.
///
/// The Roomcast protocol is JSON over text frames, so the seam is
/// string-shaped rather than byte-shaped. Implemented by [`WsConnection`]
/// for real sessions and by in-memory fakes in tests.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends one fully serialized frame to the remote peer.
    ///
    /// No buffering or fragmentation happens here; the frame goes out as-is.
    async fn send(&self, frame: &str) -> Result<(), Self::Error>;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed. Frames are
    /// delivered one at a time, in arrival order.
    async fn recv(&self) -> Result<Option<String>, Self::Error>;

    /// Closes the connection. The recv side then winds down with `None`.
    async fn close(&self) -> Result<(), Self::Error>;
}
