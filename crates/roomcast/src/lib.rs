//! # Roomcast
//!
//! Client for a key-addressed room/player state-sync protocol carried
//! over a persistent WebSocket session.
//!
//! The sync service maintains two logical documents per session: a shared
//! **room** document visible to every participant and a private **player**
//! document scoped to this participant. The service pushes key-addressed
//! full-replacement deltas; [`RoomcastClient`] mirrors both documents
//! locally, notifies observers with before/after [`Revision`]s, and sends
//! sequence-numbered action frames back.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roomcast::{ClientConfig, RoomcastClient};
//! use serde::Deserialize;
//!
//! #[derive(Clone, Default, Deserialize)]
//! struct Room { state: Option<String> }
//! #[derive(Clone, Default, Deserialize)]
//! struct Player { score: Option<u32> }
//!
//! # async fn example() -> Result<(), roomcast::ClientError> {
//! let client: RoomcastClient<Room, Player> =
//!     RoomcastClient::new(ClientConfig::new("sync.example.com", "ABCD", "Bot"));
//!
//! client.on_room_update(|_rev| {
//!     // _rev.old / _rev.new are the room before and after the delta
//! }).await;
//!
//! // Resolves when the session ends; keep a clone for sending.
//! client.connect().await?;
//! # Ok(())
//! # }
//! ```

mod bootstrap;
mod client;
mod config;
mod error;
mod events;
mod state;

pub use bootstrap::SUBPROTOCOL;
pub use client::RoomcastClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use state::{GameState, Revision};

pub use roomcast_protocol::{
    ClientEnvelope, ClientSend, Operation, OP_CLIENT_SEND,
    OP_CLIENT_WELCOME, OP_OBJECT, OP_TEXT, SERVICE_ADDRESS,
};
pub use roomcast_transport::{
    Connection, ShutdownSignal, TransportError, WsConnection,
};
