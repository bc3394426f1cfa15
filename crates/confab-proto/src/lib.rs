//! Wire contract for the Confab conversation service.
//!
//! Defines the logical, transport-agnostic protocol the client speaks: the
//! four named inbound channels ([`Topic`]), the two outbound destinations
//! ([`Destination`]), and the JSON payloads that flow over them. The actual
//! transport (socket, broker, whatever carries the frames) is an external
//! collaborator; this crate only knows how to name channels and encode or
//! decode what travels on them.
//!
//! # Invariants
//!
//! - `Topic::parse` and `Topic::name` round-trip for every topic.
//! - Decoding never panics and never partially constructs a value; a bad
//!   frame yields [`ProtocolError::Decode`] and nothing else.
//! - Provisional message ids carry the `local-` prefix, so they structurally
//!   cannot collide with server-assigned numeric-as-string ids.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod topic;
mod wire;

pub use error::ProtocolError;
pub use topic::{Destination, Topic};
pub use wire::{
    ConfirmationFrame, MessageFrame, MessageStatus, MessageType, NotificationFrame,
    SendMessageRequest, SendTypingRequest, TypingFrame, decode, encode,
};

/// Numeric conversation identifier.
pub type ConversationId = u64;

/// Prefix that marks a client-generated provisional message id.
pub const PROVISIONAL_ID_PREFIX: &str = "local-";

/// Whether a message id was generated locally (optimistic entry) rather than
/// assigned by the server.
#[must_use]
pub fn is_provisional_id(id: &str) -> bool {
    id.starts_with(PROVISIONAL_ID_PREFIX)
}
