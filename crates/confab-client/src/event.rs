//! Client events and actions.
//!
//! The single dispatch surface between the host and the messaging core. The
//! host is responsible for:
//! - Forwarding inbound frames and transport lifecycle outcomes
//! - Driving time forward via ticks
//! - Forwarding UI intents (open conversation, send message, typing)
//!
//! and for executing the returned [`ClientAction`]s against the real
//! transport, notification surface, and REST collaborator. One event kind
//! per input replaces ad hoc per-callback registration, so switching the
//! active conversation can never race a stale handler.
//!
//! Generic over `I` (Instant type) to support both production
//! (`std::time::Instant`) and virtual-clock test environments.

use confab_core::ClientError;
use confab_proto::{ConversationId, Destination, MessageFrame, MessageType, Topic};

use crate::notifier::Notification;

/// Events the host feeds into the client.
#[derive(Debug, Clone)]
pub enum ClientEvent<I = std::time::Instant> {
    /// User selected a conversation. Tears down any previous session first.
    OpenConversation {
        /// Conversation to open.
        conversation_id: ConversationId,
    },

    /// Chat surface unmounted; release the session.
    CloseConversation,

    /// Transport completed the handshake for the pending open.
    TransportConnected,

    /// Transport could not establish or authenticate the channel.
    TransportFailed {
        /// Failure description from the transport.
        reason: String,
    },

    /// A live channel dropped. The core surfaces `Disconnected` and waits
    /// for the next explicit open.
    TransportClosed,

    /// Frame received on a subscribed topic.
    FrameReceived {
        /// Topic string the frame arrived on.
        topic: String,
        /// Raw payload bytes.
        payload: Vec<u8>,
    },

    /// History fetch (requested via [`ClientAction::FetchHistory`]) resolved.
    HistoryLoaded {
        /// Conversation the history belongs to.
        conversation_id: ConversationId,
        /// Messages in chronological order.
        messages: Vec<MessageFrame>,
    },

    /// User submitted a message in the active conversation.
    SendMessage {
        /// Message body.
        content: String,
        /// Content kind.
        message_type: MessageType,
    },

    /// User started or stopped typing in the active conversation.
    SendTyping {
        /// `true` = started typing, `false` = stopped.
        typing: bool,
    },

    /// Host document visibility changed (drives notification gating).
    VisibilityChanged {
        /// Whether the chat surface is currently visible.
        visible: bool,
    },

    /// Time tick for timeout processing.
    ///
    /// The host should send ticks periodically so the client can detect
    /// handshake and send timeouts.
    Tick {
        /// Current time from the environment.
        now: I,
    },
}

/// Actions the client produces for the host to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Open the channel and authenticate with this bearer token.
    Authenticate {
        /// Bearer token from the credential provider.
        token: String,
    },

    /// Release the channel.
    Disconnect,

    /// Register for a topic.
    Subscribe(Topic),

    /// Release a topic registration.
    Unsubscribe(Topic),

    /// Publish a payload to an outbound destination.
    Publish {
        /// Outbound destination.
        destination: Destination,
        /// Encoded JSON payload.
        payload: Vec<u8>,
    },

    /// Fetch conversation history from the REST collaborator.
    ///
    /// The result comes back as [`ClientEvent::HistoryLoaded`] and seeds the
    /// dedupe set, so history and live stream dedupe against the same set.
    FetchHistory {
        /// Conversation to fetch.
        conversation_id: ConversationId,
    },

    /// Raise an out-of-band notification (document is hidden).
    RaiseNotification(Notification),

    /// Play the notification sound.
    PlaySound,

    /// Observable state changed; the UI should re-read its snapshots.
    Render,

    /// Report an error through the single error channel.
    ReportError(ClientError),
}
