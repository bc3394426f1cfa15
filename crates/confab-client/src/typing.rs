//! Typing presence.
//!
//! Maintains the set of currently-typing participants for the active
//! conversation, driven entirely by server events. There is deliberately no
//! client-side expiry timer: an indicator is only as fresh as the last
//! server event, and a crashed remote client that never sends stop-typing
//! leaves a stale indicator until overwritten or the conversation is
//! reopened. Papering over that with a local timeout would mask a
//! provider-side defect, so the limitation stays visible.

use std::collections::BTreeMap;

use confab_proto::TypingFrame;

/// Set of remote participants currently typing.
#[derive(Debug, Clone, Default)]
pub struct TypingTracker {
    local_user_id: String,
    /// userId → displayName. Ordered for deterministic rendering.
    typists: BTreeMap<String, String>,
}

impl TypingTracker {
    /// Create a tracker that filters out the local user's own events.
    pub fn new(local_user_id: impl Into<String>) -> Self {
        Self { local_user_id: local_user_id.into(), typists: BTreeMap::new() }
    }

    /// Apply a typing transition. Returns whether the set changed.
    ///
    /// Self-originated events are ignored — a user never sees their own
    /// typing reflected back. `typing=true` inserts or refreshes the display
    /// name; `typing=false` removes.
    pub fn on_event(&mut self, frame: &TypingFrame) -> bool {
        if frame.user_id == self.local_user_id {
            return false;
        }

        if frame.typing {
            self.typists.insert(frame.user_id.clone(), frame.user_name.clone())
                != Some(frame.user_name.clone())
        } else {
            self.typists.remove(&frame.user_id).is_some()
        }
    }

    /// Currently-typing participants as (userId, displayName), sorted by id.
    pub fn typists(&self) -> impl Iterator<Item = (&str, &str)> {
        self.typists.iter().map(|(id, name)| (id.as_str(), name.as_str()))
    }

    /// Number of remote participants currently typing.
    #[must_use]
    pub fn len(&self) -> usize {
        self.typists.len()
    }

    /// Whether nobody is typing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.typists.is_empty()
    }

    /// Drop all indicators (conversation switch or disconnect).
    pub fn clear(&mut self) {
        self.typists.clear();
    }
}
