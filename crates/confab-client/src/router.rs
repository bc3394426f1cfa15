//! Topic routing.
//!
//! Classifies inbound frames by the topic they arrived on and decodes them
//! into their typed form. Routing is total: a frame either becomes a
//! [`RoutedFrame`] or a [`ClientError::MalformedFrame`] — never a crash,
//! never a partial mutation, because nothing here mutates at all. The client
//! dispatches the result one-way to the owning component.

use confab_core::ClientError;
use confab_proto::{
    ConfirmationFrame, MessageFrame, NotificationFrame, Topic, TypingFrame, decode,
};

/// An inbound frame decoded and labeled with its destination component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutedFrame {
    /// Conversation message → reconciler.
    Message(MessageFrame),
    /// Typing transition → typing tracker.
    Typing(TypingFrame),
    /// Delivery confirmation → reconciler.
    Confirmation(ConfirmationFrame),
    /// Personal-queue event → notifier.
    Notification(NotificationFrame),
    /// Bare keepalive on the personal queue; dropped without dispatch.
    Heartbeat,
}

/// Decode a raw payload according to its topic.
///
/// # Errors
///
/// [`ClientError::MalformedFrame`] if the payload does not parse as the
/// frame shape the topic carries. The caller reports it on the error channel
/// and drops the frame.
pub fn route(topic: &Topic, payload: &[u8]) -> Result<RoutedFrame, ClientError> {
    match topic {
        Topic::Messages { .. } => decode::<MessageFrame>(payload)
            .map(RoutedFrame::Message)
            .map_err(|e| ClientError::malformed(topic, &e)),
        Topic::Typing { .. } => decode::<TypingFrame>(payload)
            .map(RoutedFrame::Typing)
            .map_err(|e| ClientError::malformed(topic, &e)),
        Topic::Confirmations { .. } => decode::<ConfirmationFrame>(payload)
            .map(RoutedFrame::Confirmation)
            .map_err(|e| ClientError::malformed(topic, &e)),
        Topic::Notifications { .. } => decode::<NotificationFrame>(payload)
            .map(|frame| {
                if frame.is_heartbeat() {
                    RoutedFrame::Heartbeat
                } else {
                    RoutedFrame::Notification(frame)
                }
            })
            .map_err(|e| ClientError::malformed(topic, &e)),
    }
}
