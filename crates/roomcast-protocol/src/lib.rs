//! Wire protocol for the Roomcast client.
//!
//! Defines the JSON envelopes the sync service speaks:
//!
//! - **Inbound** ([`ServerEnvelope`], [`WelcomeResult`], [`Operation`]) —
//!   server-pushed frames carrying an opcode and an opcode-dependent
//!   result payload.
//! - **Outbound** ([`ClientEnvelope`], [`ClientSend`]) — sequence-numbered
//!   action frames sent by the client.
//! - **Codec** ([`decode_frame`], [`encode_frame`]) — the single place
//!   where bytes on the wire become typed frames and back.
//!
//! The protocol layer knows nothing about connections or document state;
//! it only maps between JSON text and these types.

mod codec;
mod error;
mod types;

pub use codec::{decode_frame, encode_frame, InboundFrame};
pub use error::ProtocolError;
pub use types::{
    ClientEnvelope, ClientSend, Operation, ServerEnvelope, WelcomeResult,
    OP_CLIENT_SEND, OP_CLIENT_WELCOME, OP_OBJECT, OP_TEXT,
    SERVICE_ADDRESS,
};
