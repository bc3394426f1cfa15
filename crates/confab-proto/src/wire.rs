//! JSON frame payloads.
//!
//! The conversation service publishes camelCase JSON on every channel, so
//! every struct here carries `rename_all = "camelCase"` and wire enums use
//! SCREAMING_SNAKE_CASE (`TEXT`, `SENT`). Unknown fields are tolerated to
//! stay forward compatible with service-side additions.
//!
//! Decoding is total: any malformed payload becomes
//! [`ProtocolError::Decode`] without touching client state.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{ConversationId, ProtocolError};

/// Message content kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Plain text body.
    Text,
    /// Image attachment reference.
    Image,
    /// Generic file attachment reference.
    File,
}

/// Delivery lifecycle of a message.
///
/// `Sending` only ever exists locally (an optimistic entry awaiting its
/// echo); the other three arrive from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    /// Local submission not yet confirmed by the server.
    Sending,
    /// Accepted by the server.
    Sent,
    /// Delivered to the recipient.
    Delivered,
    /// Send failed or timed out.
    Failed,
}

/// A message published on `conversation.{id}.messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageFrame {
    /// Server-assigned id (numeric-as-string).
    pub id: String,
    /// Conversation the message belongs to.
    pub conversation_id: ConversationId,
    /// Author's user id.
    pub sender_id: String,
    /// Author's display name.
    pub sender_name: String,
    /// Author's avatar URL, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_avatar: Option<String>,
    /// Content kind.
    pub message_type: MessageType,
    /// Message body or attachment reference.
    pub content: String,
    /// Server-side creation timestamp (ISO-8601).
    pub created_at: String,
    /// Delivery status at publish time.
    pub status: MessageStatus,
}

/// A typing transition published on `conversation.{id}.typing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingFrame {
    /// Conversation the indicator belongs to.
    pub conversation_id: ConversationId,
    /// User whose typing state changed.
    pub user_id: String,
    /// Display name for rendering the indicator.
    pub user_name: String,
    /// `true` = started typing, `false` = stopped.
    pub typing: bool,
}

/// A delivery confirmation published on `user.{id}.confirmations`.
///
/// Correlated by id to a previously sent message; transient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationFrame {
    /// Server id of the confirmed message.
    pub message_id: String,
    /// New delivery status.
    pub status: MessageStatus,
}

/// An out-of-band event published on `user.{id}.notifications`.
///
/// The personal queue also carries bare keepalive frames; those have neither
/// content nor an error marker and must be ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFrame {
    /// Conversation that originated the event (click-through target).
    pub conversation_id: ConversationId,
    /// Sender display name.
    pub sender_name: String,
    /// Sender avatar URL, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_avatar: Option<String>,
    /// Message preview body. Absent on keepalive frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Service error marker, if the event reports a failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl NotificationFrame {
    /// Bare keepalive frame: no content and no error marker.
    #[must_use]
    pub fn is_heartbeat(&self) -> bool {
        self.content.is_none() && self.error_code.is_none()
    }
}

/// Outbound message submission published to `send.message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Target conversation.
    pub conversation_id: ConversationId,
    /// Authenticated sender.
    pub sender_id: String,
    /// Content kind.
    pub message_type: MessageType,
    /// Message body.
    pub content: String,
}

/// Outbound typing transition published to `send.typing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTypingRequest {
    /// Target conversation.
    pub conversation_id: ConversationId,
    /// Authenticated user.
    pub user_id: String,
    /// `true` = started typing, `false` = stopped.
    pub typing: bool,
}

/// Decode a JSON payload into a frame type.
///
/// # Errors
///
/// Returns [`ProtocolError::Decode`] if the bytes are not valid JSON for `T`.
pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T, ProtocolError> {
    serde_json::from_slice(payload).map_err(|e| ProtocolError::Decode { reason: e.to_string() })
}

/// Encode a frame type as a JSON payload.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails (does not happen
/// for the types in this crate, but the signature stays total).
pub fn encode<T: Serialize>(frame: &T) -> Result<Vec<u8>, ProtocolError> {
    serde_json::to_vec(frame).map_err(|e| ProtocolError::Encode { reason: e.to_string() })
}
