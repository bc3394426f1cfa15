//! Per-conversation session lifecycle.
//!
//! One [`Session`] exists per mounted chat surface. It owns the connection
//! state and the subscription set for the active conversation, and uses the
//! action pattern: methods take time as input and return actions for the
//! driver to execute. The handshake is asynchronous — `open` emits an
//! `Authenticate` action and the transport reports the outcome later — so
//! nothing here ever blocks.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────────┐  open    ┌────────────┐  handshake ok   ┌───────────┐
//! │ Disconnected │─────────>│ Connecting │────────────────>│ Connected │
//! └──────────────┘          └────────────┘                 └───────────┘
//!        ↑                        │ fail/timeout                 │ drop/close
//!        │                        ↓                              ↓
//!        │                   ┌────────┐                   ┌──────────────┐
//!        └───── reopen ──────│ Failed │                   │ Disconnected │
//!                            └────────┘                   └──────────────┘
//! ```
//!
//! A dropped session is surfaced as `Disconnected` and stays there: the core
//! deliberately does not auto-retry, the next explicit open re-establishes.

use std::{ops::Sub, time::Duration};

use confab_proto::{ConversationId, Topic};

use crate::error::ClientError;

/// Time allowed for the transport to complete the asynchronous handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Bearer token and derived user id from the credential provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User id derived from the token.
    pub user_id: String,
    /// Bearer token presented during the handshake.
    pub token: String,
}

impl Credentials {
    /// Create credentials from a token and its derived user id.
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), token: token.into() }
    }
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Timeout for completing the handshake.
    pub connect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { connect_timeout: DEFAULT_CONNECT_TIMEOUT }
    }
}

/// Connection state of the active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No live channel. Initial state, and the resting state after a drop.
    Disconnected,
    /// Authenticate action emitted, waiting for the transport's verdict.
    Connecting,
    /// Handshake complete, subscriptions established.
    Connected,
    /// Handshake failed or timed out. Requires an explicit reopen.
    Failed,
}

/// Actions returned by the session state machine.
///
/// The driver executes these against the real transport: authenticate opens
/// the channel, subscribe/unsubscribe manage topic registrations, disconnect
/// releases the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Open the channel and authenticate with this bearer token.
    Authenticate {
        /// Bearer token from the credential provider.
        token: String,
    },
    /// Register for a topic.
    Subscribe(Topic),
    /// Release a topic registration.
    Unsubscribe(Topic),
    /// Release the channel itself.
    Disconnect,
}

/// Per-conversation session state machine.
///
/// Pure state machine, no I/O. Generic over `Instant` to support both real
/// time and the virtual clock used in deterministic tests.
#[derive(Debug, Clone)]
pub struct Session<I = std::time::Instant>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    conversation_id: ConversationId,
    user_id: String,
    state: SessionState,
    subscriptions: Vec<Topic>,
    config: SessionConfig,
    opened_at: I,
    closed: bool,
}

impl<I> Session<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Open a session for a conversation.
    ///
    /// Validates the credentials and emits the `Authenticate` action; the
    /// transport reports the handshake outcome asynchronously via
    /// [`Session::handshake_complete`] or [`Session::handshake_failed`].
    ///
    /// # Errors
    ///
    /// `ClientError::Connection` if the bearer token or derived user id is
    /// missing. The caller reports this through the error channel rather
    /// than throwing it at the UI.
    pub fn open(
        conversation_id: ConversationId,
        credentials: &Credentials,
        now: I,
        config: SessionConfig,
    ) -> Result<(Self, Vec<SessionAction>), ClientError> {
        if credentials.token.is_empty() {
            return Err(ClientError::Connection { reason: "missing bearer token".to_string() });
        }
        if credentials.user_id.is_empty() {
            return Err(ClientError::Connection {
                reason: "credential provider yielded no user id".to_string(),
            });
        }

        let session = Self {
            conversation_id,
            user_id: credentials.user_id.clone(),
            state: SessionState::Connecting,
            subscriptions: Vec::new(),
            config,
            opened_at: now,
            closed: false,
        };

        let actions = vec![SessionAction::Authenticate { token: credentials.token.clone() }];
        Ok((session, actions))
    }

    /// Conversation this session is scoped to.
    #[must_use]
    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Authenticated user id the user-scoped topics are derived from.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether sends are currently allowed.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Topics currently held by this session.
    #[must_use]
    pub fn subscriptions(&self) -> &[Topic] {
        &self.subscriptions
    }

    /// Transport finished the handshake.
    ///
    /// Transitions to `Connected` and subscribes the four logical topics
    /// scoped to this conversation and the authenticated user. A stale
    /// completion (session already closed or failed) yields no actions.
    pub fn handshake_complete(&mut self) -> Vec<SessionAction> {
        if self.state != SessionState::Connecting {
            return Vec::new();
        }

        self.state = SessionState::Connected;
        self.subscriptions = vec![
            Topic::Messages { conversation_id: self.conversation_id },
            Topic::Typing { conversation_id: self.conversation_id },
            Topic::Confirmations { user_id: self.user_id.clone() },
            Topic::Notifications { user_id: self.user_id.clone() },
        ];

        self.subscriptions.iter().cloned().map(SessionAction::Subscribe).collect()
    }

    /// Transport reported a handshake or authentication failure.
    ///
    /// Transitions to `Failed` and returns the error to report. The send
    /// affordance stays disabled until the conversation is reopened.
    pub fn handshake_failed(&mut self, reason: impl Into<String>) -> ClientError {
        self.state = SessionState::Failed;
        self.subscriptions.clear();
        ClientError::Connection { reason: reason.into() }
    }

    /// Transport dropped the live channel.
    ///
    /// Surfaces `Disconnected` and nothing else — no auto-retry. The
    /// subscriptions died with the channel, so the set is cleared.
    pub fn transport_closed(&mut self) {
        if matches!(self.state, SessionState::Connecting | SessionState::Connected) {
            self.state = SessionState::Disconnected;
            self.subscriptions.clear();
        }
    }

    /// Release all subscriptions and the channel. Idempotent.
    pub fn close(&mut self) -> Vec<SessionAction> {
        if self.closed {
            return Vec::new();
        }
        self.closed = true;

        let mut actions: Vec<SessionAction> =
            self.subscriptions.drain(..).map(SessionAction::Unsubscribe).collect();

        // Only a live or half-open channel needs releasing.
        if matches!(self.state, SessionState::Connecting | SessionState::Connected) {
            actions.push(SessionAction::Disconnect);
        }

        self.state = SessionState::Disconnected;
        actions
    }

    /// Periodic maintenance: detect a handshake that never completed.
    ///
    /// Returns the error to report if the connect timeout elapsed while
    /// still `Connecting`; the session moves to `Failed`.
    pub fn tick(&mut self, now: I) -> Option<ClientError> {
        if self.state != SessionState::Connecting {
            return None;
        }

        let elapsed = now - self.opened_at;
        if elapsed > self.config.connect_timeout {
            self.state = SessionState::Failed;
            Some(ClientError::Connection { reason: format!("handshake timeout after {elapsed:?}") })
        } else {
            None
        }
    }
}
