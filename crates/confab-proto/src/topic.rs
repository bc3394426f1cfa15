//! Channel naming.
//!
//! Four inbound topics per user/conversation pair and two outbound
//! destinations. Topic strings are the only stringly-typed surface of the
//! protocol; everything past `parse` works with the enum.

use std::fmt;

use crate::{ConversationId, ProtocolError};

/// A named logical channel the client subscribes to.
///
/// Conversation-scoped topics are torn down and re-established when the
/// active conversation changes; user-scoped topics follow the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Messages published to a conversation.
    Messages {
        /// Conversation the channel is scoped to.
        conversation_id: ConversationId,
    },

    /// Typing indicator events for a conversation.
    Typing {
        /// Conversation the channel is scoped to.
        conversation_id: ConversationId,
    },

    /// Delivery confirmations for messages this user sent.
    Confirmations {
        /// Authenticated user the channel is scoped to.
        user_id: String,
    },

    /// The user's personal out-of-band notification queue.
    Notifications {
        /// Authenticated user the channel is scoped to.
        user_id: String,
    },
}

impl Topic {
    /// Canonical topic string, e.g. `conversation.42.messages`.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Messages { conversation_id } => {
                format!("conversation.{conversation_id}.messages")
            },
            Self::Typing { conversation_id } => format!("conversation.{conversation_id}.typing"),
            Self::Confirmations { user_id } => format!("user.{user_id}.confirmations"),
            Self::Notifications { user_id } => format!("user.{user_id}.notifications"),
        }
    }

    /// Parse a topic string back into its structured form.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownTopic`] for anything that does not
    /// match one of the four channel patterns.
    pub fn parse(topic: &str) -> Result<Self, ProtocolError> {
        let unknown = || ProtocolError::UnknownTopic { topic: topic.to_string() };

        let mut parts = topic.splitn(3, '.');
        let (scope, id, kind) = match (parts.next(), parts.next(), parts.next()) {
            (Some(scope), Some(id), Some(kind)) => (scope, id, kind),
            _ => return Err(unknown()),
        };

        match (scope, kind) {
            ("conversation", "messages") => {
                let conversation_id = id.parse().map_err(|_| unknown())?;
                Ok(Self::Messages { conversation_id })
            },
            ("conversation", "typing") => {
                let conversation_id = id.parse().map_err(|_| unknown())?;
                Ok(Self::Typing { conversation_id })
            },
            ("user", "confirmations") if !id.is_empty() && !id.contains('.') => {
                Ok(Self::Confirmations { user_id: id.to_string() })
            },
            ("user", "notifications") if !id.is_empty() && !id.contains('.') => {
                Ok(Self::Notifications { user_id: id.to_string() })
            },
            _ => Err(unknown()),
        }
    }

    /// Whether this topic is scoped to a conversation (as opposed to the
    /// authenticated user).
    #[must_use]
    pub fn is_conversation_scoped(&self) -> bool {
        matches!(self, Self::Messages { .. } | Self::Typing { .. })
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Outbound destination the client publishes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Submit a chat message.
    SendMessage,
    /// Publish a typing indicator transition.
    SendTyping,
}

impl Destination {
    /// Canonical destination string.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::SendMessage => "send.message",
            Self::SendTyping => "send.typing",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
