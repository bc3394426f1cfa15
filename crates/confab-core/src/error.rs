//! Client error taxonomy.
//!
//! Four conditions cover everything the messaging core can fail at. All of
//! them travel to the UI through the single error channel (the client's
//! `ReportError` action); none are thrown synchronously across an async
//! handler boundary.
//!
//! Parse and dedupe failures are recovered locally (the frame is dropped);
//! they are still reported so the host can log them, but the UI cannot
//! meaningfully act on a single dropped frame.

use std::time::Duration;

use confab_proto::{ProtocolError, Topic};
use thiserror::Error;

/// Errors surfaced by the messaging core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Handshake or authentication failure. Reported once; the core performs
    /// no retry — the next explicit open re-establishes the session.
    #[error("connection failed: {reason}")]
    Connection {
        /// Handshake/auth failure description.
        reason: String,
    },

    /// Inbound frame did not parse. The frame is dropped without mutating
    /// any state.
    #[error("malformed frame on {topic}: {reason}")]
    MalformedFrame {
        /// Topic the frame arrived on.
        topic: String,
        /// Decode failure description.
        reason: String,
    },

    /// A submitted message saw neither echo nor confirmation within the
    /// bound. The entry is marked `Failed` and leaves pending tracking.
    #[error("send timed out after {elapsed:?} (provisional id {provisional_id})")]
    SendTimeout {
        /// Provisional id of the unresolved submission.
        provisional_id: String,
        /// How long the submission waited.
        elapsed: Duration,
    },

    /// Send attempted while the session is not connected. Rejected
    /// immediately so it can never silently hang in the pending set.
    #[error("not connected: cannot {operation}")]
    NotConnected {
        /// Operation that was attempted.
        operation: &'static str,
    },
}

impl ClientError {
    /// Wrap a decode failure with the topic it occurred on.
    #[must_use]
    pub fn malformed(topic: &Topic, err: &ProtocolError) -> Self {
        Self::MalformedFrame { topic: topic.name(), reason: err.to_string() }
    }

    /// Whether the session survives this error.
    ///
    /// Recoverable errors affect a single frame or message (shown as a
    /// `Failed` badge, logged, dropped); the others disable the send
    /// affordance until the conversation is reopened.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedFrame { .. } | Self::SendTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientError, Duration};

    #[test]
    fn frame_level_errors_are_recoverable() {
        assert!(
            ClientError::MalformedFrame {
                topic: "conversation.42.messages".to_string(),
                reason: "bad json".to_string(),
            }
            .is_recoverable()
        );

        assert!(
            ClientError::SendTimeout {
                provisional_id: "local-1-00000001".to_string(),
                elapsed: Duration::from_secs(10),
            }
            .is_recoverable()
        );
    }

    #[test]
    fn session_level_errors_require_reopen() {
        assert!(!ClientError::Connection { reason: "bad token".to_string() }.is_recoverable());
        assert!(!ClientError::NotConnected { operation: "send message" }.is_recoverable());
    }
}
