//! Message reconciliation.
//!
//! Single source of truth for the active conversation's ordered message
//! sequence. Merges optimistic (locally originated, unconfirmed) entries and
//! server-confirmed ones into one sequence without duplication, and tracks
//! outstanding sends against a bounded wait.
//!
//! A [`Reconciler`] lives exactly as long as its conversation view:
//! constructed on conversation open, destroyed on close. The seen-id set and
//! pending queue are owned and mutated exclusively by its own handlers — all
//! inter-component communication is one-way dispatch, never shared memory.
//!
//! # Echo correlation
//!
//! Echoes are matched FIFO against the oldest unresolved provisional entry,
//! not by content. This is an explicit, documented policy: the service does
//! not round-trip an idempotency key, so two rapid local sends may reconcile
//! out of submission order if the server echoes out of order. When the
//! service grows a correlation key, `PendingSend` gains a tagged variant
//! carrying it.

use std::{
    collections::{HashSet, VecDeque},
    ops::Sub,
    time::Duration,
};

use confab_core::ClientError;
use confab_proto::{
    ConfirmationFrame, ConversationId, MessageFrame, MessageStatus, MessageType,
    PROVISIONAL_ID_PREFIX, is_provisional_id,
};

/// Bounded wait for an echo or confirmation before a send is marked failed.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// A message in the rendered sequence.
///
/// Either a server-confirmed entry (built from a [`MessageFrame`]) or an
/// optimistic local submission awaiting its echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Server id (numeric-as-string) or provisional `local-` id.
    pub id: String,
    /// Conversation the message belongs to.
    pub conversation_id: ConversationId,
    /// Author's user id.
    pub sender_id: String,
    /// Author's display name. `None` until the echo fills it in.
    pub sender_name: Option<String>,
    /// Content kind.
    pub message_type: MessageType,
    /// Message body.
    pub content: String,
    /// Server-side creation timestamp. `None` for optimistic entries.
    pub created_at: Option<String>,
    /// Delivery lifecycle state.
    pub status: MessageStatus,
    /// Whether this entry is still awaiting server confirmation.
    pub is_optimistic: bool,
}

impl Message {
    fn confirmed(frame: MessageFrame) -> Self {
        Self {
            id: frame.id,
            conversation_id: frame.conversation_id,
            sender_id: frame.sender_id,
            sender_name: Some(frame.sender_name),
            message_type: frame.message_type,
            content: frame.content,
            created_at: Some(frame.created_at),
            status: frame.status,
            is_optimistic: false,
        }
    }
}

/// An outstanding local submission, destroyed on echo or timeout.
#[derive(Debug, Clone)]
struct PendingSend<I> {
    provisional_id: String,
    submitted_at: I,
}

/// Reconciles the optimistic and server-confirmed views of one conversation.
#[derive(Debug, Clone)]
pub struct Reconciler<I = std::time::Instant>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    conversation_id: ConversationId,
    local_user_id: String,
    messages: Vec<Message>,
    /// Server ids already represented in the sequence. Seeded from the
    /// history fetch so history and live stream dedupe against the same set.
    seen_ids: HashSet<String>,
    /// Oldest-first queue of unresolved local submissions.
    pending: VecDeque<PendingSend<I>>,
    send_timeout: Duration,
    next_seq: u64,
}

impl<I> Reconciler<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create a reconciler for a freshly opened conversation.
    pub fn new(
        conversation_id: ConversationId,
        local_user_id: impl Into<String>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            conversation_id,
            local_user_id: local_user_id.into(),
            messages: Vec::new(),
            seen_ids: HashSet::new(),
            pending: VecDeque::new(),
            send_timeout,
            next_seq: 0,
        }
    }

    /// The rendered message sequence, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of unresolved local submissions.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of distinct server ids seen so far.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen_ids.len()
    }

    /// Record a local submission and append its optimistic entry at the tail.
    ///
    /// The provisional id is namespaced with the `local-` prefix so it
    /// structurally cannot collide with a server-assigned id. `nonce` comes
    /// from the environment so ids stay unique across reconciler lifetimes.
    pub fn submit(
        &mut self,
        content: impl Into<String>,
        message_type: MessageType,
        now: I,
        nonce: u64,
    ) -> String {
        let provisional_id = format!("{PROVISIONAL_ID_PREFIX}{}-{nonce:016x}", self.next_seq);
        self.next_seq += 1;

        self.messages.push(Message {
            id: provisional_id.clone(),
            conversation_id: self.conversation_id,
            sender_id: self.local_user_id.clone(),
            sender_name: None,
            message_type,
            content: content.into(),
            created_at: None,
            status: MessageStatus::Sending,
            is_optimistic: true,
        });

        self.pending
            .push_back(PendingSend { provisional_id: provisional_id.clone(), submitted_at: now });

        provisional_id
    }

    /// Merge an inbound frame into the sequence.
    ///
    /// Duplicates (by server id) are dropped, as are frames carrying a
    /// client-namespaced `local-` id — the server never assigns those, and
    /// accepting one could collide with a live provisional entry. Our own
    /// echo resolves the oldest unresolved provisional entry in place;
    /// everything else appends at the tail. Returns whether the sequence
    /// changed.
    pub fn on_inbound(&mut self, frame: MessageFrame) -> bool {
        if is_provisional_id(&frame.id) {
            tracing::debug!(id = %frame.id, "dropping inbound frame with client-namespaced id");
            return false;
        }

        if !self.seen_ids.insert(frame.id.clone()) {
            tracing::debug!(id = %frame.id, "dropping duplicate inbound message");
            return false;
        }

        if frame.sender_id == self.local_user_id
            && let Some(pending) = self.pending.pop_front()
        {
            // Replace-in-place: the optimistic entry and its echo never
            // coexist as two sequence entries.
            if let Some(slot) =
                self.messages.iter().position(|m| m.id == pending.provisional_id)
            {
                self.messages[slot] = Message::confirmed(frame);
                return true;
            }
        }

        self.messages.push(Message::confirmed(frame));
        true
    }

    /// Apply a delivery confirmation in place.
    ///
    /// A miss (confirmation precedes the echo, or the message is outside the
    /// cached window) is a silent no-op — never a phantom entry.
    pub fn on_confirmation(&mut self, confirmation: &ConfirmationFrame) -> bool {
        match self.messages.iter_mut().find(|m| m.id == confirmation.message_id) {
            Some(message) => {
                message.status = confirmation.status;
                true
            },
            None => {
                tracing::debug!(
                    message_id = %confirmation.message_id,
                    "confirmation for unknown message, ignoring"
                );
                false
            },
        }
    }

    /// Seed the sequence and dedupe set from the history fetch.
    ///
    /// Live frames can beat the fetch, so history lands in front of anything
    /// already in the sequence; ids the live stream already delivered are
    /// skipped.
    pub fn seed_history(&mut self, frames: Vec<MessageFrame>) {
        let mut seeded: Vec<Message> = frames
            .into_iter()
            .filter(|frame| !is_provisional_id(&frame.id) && self.seen_ids.insert(frame.id.clone()))
            .map(Message::confirmed)
            .collect();

        seeded.append(&mut self.messages);
        self.messages = seeded;
    }

    /// Expire submissions that outlived the bounded wait.
    ///
    /// Each expired entry is marked `Failed`, dropped from pending tracking
    /// (so it can never fire twice), and reported as a [`ClientError`].
    pub fn tick(&mut self, now: I) -> Vec<ClientError> {
        let mut errors = Vec::new();

        // Submissions are queued oldest first, so expiry stops at the first
        // entry still inside the bound.
        while let Some(front) = self.pending.front() {
            let elapsed = now - front.submitted_at;
            if elapsed <= self.send_timeout {
                break;
            }

            let expired = self
                .pending
                .pop_front()
                .map(|p| p.provisional_id)
                .unwrap_or_default();

            if let Some(message) = self.messages.iter_mut().find(|m| m.id == expired) {
                message.status = MessageStatus::Failed;
                message.is_optimistic = false;
            }

            errors.push(ClientError::SendTimeout { provisional_id: expired, elapsed });
        }

        errors
    }
}
