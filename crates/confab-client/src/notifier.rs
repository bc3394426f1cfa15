//! Out-of-band notifications.
//!
//! Conversation-independent listener for the user's personal queue. When a
//! qualifying event arrives while the document is hidden, it produces a
//! [`Notification`] the host raises natively (with a click-through to the
//! originating conversation) alongside a sound. While the document is
//! visible nothing is raised — the active surface already renders the
//! message.

use confab_proto::NotificationFrame;

/// Longest notification body before the ellipsis cut.
pub const NOTIFICATION_BODY_LIMIT: usize = 50;

/// A notification ready for the host's native surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Conversation to open on click-through.
    pub conversation_id: confab_proto::ConversationId,
    /// Sender display name (notification title).
    pub title: String,
    /// Sender avatar URL, if set.
    pub avatar: Option<String>,
    /// Body, truncated to [`NOTIFICATION_BODY_LIMIT`] characters.
    pub body: String,
}

/// Gates personal-queue events on document visibility.
#[derive(Debug, Clone)]
pub struct Notifier {
    visible: bool,
}

impl Notifier {
    /// Create a notifier; the surface is assumed visible until told
    /// otherwise.
    #[must_use]
    pub fn new() -> Self {
        Self { visible: true }
    }

    /// Record a visibility change from the host document.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether the document is currently visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Evaluate a personal-queue event.
    ///
    /// Returns `None` while the document is visible and for bare heartbeat
    /// frames; otherwise the notification to raise.
    pub fn on_notification(&self, frame: &NotificationFrame) -> Option<Notification> {
        if self.visible {
            return None;
        }

        let body = match (&frame.content, &frame.error_code) {
            (Some(content), _) => truncate_body(content),
            (None, Some(code)) => format!("Delivery error {code}"),
            (None, None) => return None, // bare heartbeat
        };

        Some(Notification {
            conversation_id: frame.conversation_id,
            title: frame.sender_name.clone(),
            avatar: frame.sender_avatar.clone(),
            body,
        })
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate to the body limit on a character boundary, ellipsis-suffixed.
fn truncate_body(content: &str) -> String {
    if content.chars().count() <= NOTIFICATION_BODY_LIMIT {
        return content.to_string();
    }

    let mut truncated: String = content.chars().take(NOTIFICATION_BODY_LIMIT).collect();
    truncated.push('…');
    truncated
}
