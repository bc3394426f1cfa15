//! Client state machine.
//!
//! The `Client` is the top-level state machine for the chat surface. It owns
//! the active conversation's session, reconciler, and typing tracker as one
//! unit (constructed on conversation open, destroyed on close), plus the
//! conversation-independent notifier. Events go in, actions come out; the
//! host executes the actions against the transport, the notification
//! surface, and the REST collaborator.
//!
//! Every failure surfaces through [`ClientAction::ReportError`] — `handle`
//! itself is infallible, so nothing ever throws across the async handler
//! boundary.

use std::time::Duration;

use confab_core::{
    ClientError, Credentials, Environment, Session, SessionAction, SessionConfig, SessionState,
    session::DEFAULT_CONNECT_TIMEOUT,
};
use confab_proto::{
    ConversationId, Destination, MessageType, SendMessageRequest, SendTypingRequest, Topic, encode,
};

use crate::{
    event::{ClientAction, ClientEvent},
    notifier::Notifier,
    reconciler::{DEFAULT_SEND_TIMEOUT, Message, Reconciler},
    router::{self, RoutedFrame},
    typing::TypingTracker,
};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bounded wait for an echo before a send is marked failed.
    pub send_timeout: Duration,
    /// Timeout for the asynchronous handshake.
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { send_timeout: DEFAULT_SEND_TIMEOUT, connect_timeout: DEFAULT_CONNECT_TIMEOUT }
    }
}

/// Per-conversation state, torn down as one unit on switch or close.
struct ConversationState<I>
where
    I: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>,
{
    session: Session<I>,
    reconciler: Reconciler<I>,
    typing: TypingTracker,
}

/// Top-level messaging client for one mounted chat surface.
pub struct Client<E: Environment> {
    env: E,
    credentials: Credentials,
    config: ClientConfig,
    notifier: Notifier,
    active: Option<ConversationState<E::Instant>>,
}

impl<E: Environment> Client<E> {
    /// Create a client with default timeouts.
    pub fn new(env: E, credentials: Credentials) -> Self {
        Self::with_config(env, credentials, ClientConfig::default())
    }

    /// Create a client with explicit timeouts.
    pub fn with_config(env: E, credentials: Credentials, config: ClientConfig) -> Self {
        Self { env, credentials, config, notifier: Notifier::new(), active: None }
    }

    /// Authenticated user id the client acts as.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.credentials.user_id
    }

    /// Connection state of the active session; `Disconnected` when no
    /// conversation is open.
    #[must_use]
    pub fn connection_state(&self) -> SessionState {
        self.active.as_ref().map_or(SessionState::Disconnected, |s| s.session.state())
    }

    /// Conversation currently mounted, if any.
    #[must_use]
    pub fn active_conversation(&self) -> Option<ConversationId> {
        self.active.as_ref().map(|s| s.session.conversation_id())
    }

    /// The rendered message sequence of the active conversation.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        self.active.as_ref().map_or(&[], |s| s.reconciler.messages())
    }

    /// Unresolved local submissions in the active conversation.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.active.as_ref().map_or(0, |s| s.reconciler.pending_count())
    }

    /// Distinct server ids the active conversation has seen.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.active.as_ref().map_or(0, |s| s.reconciler.seen_count())
    }

    /// Remote participants currently typing, sorted by user id.
    pub fn typists(&self) -> impl Iterator<Item = (&str, &str)> {
        self.active.iter().flat_map(|s| s.typing.typists())
    }

    /// Process an event and return the actions for the host to execute.
    pub fn handle(&mut self, event: ClientEvent<E::Instant>) -> Vec<ClientAction> {
        match event {
            ClientEvent::OpenConversation { conversation_id } => {
                self.handle_open(conversation_id)
            },
            ClientEvent::CloseConversation => {
                let mut actions = self.teardown_active();
                actions.push(ClientAction::Render);
                actions
            },
            ClientEvent::TransportConnected => self.handle_transport_connected(),
            ClientEvent::TransportFailed { reason } => self.handle_transport_failed(reason),
            ClientEvent::TransportClosed => self.handle_transport_closed(),
            ClientEvent::FrameReceived { topic, payload } => self.handle_frame(&topic, &payload),
            ClientEvent::HistoryLoaded { conversation_id, messages } => {
                self.handle_history(conversation_id, messages)
            },
            ClientEvent::SendMessage { content, message_type } => {
                self.handle_send_message(content, message_type)
            },
            ClientEvent::SendTyping { typing } => self.handle_send_typing(typing),
            ClientEvent::VisibilityChanged { visible } => {
                self.notifier.set_visible(visible);
                Vec::new()
            },
            ClientEvent::Tick { now } => self.handle_tick(now),
        }
    }

    /// Tear down the previous session (if any) and open the new one.
    ///
    /// Old subscriptions are released before anything new is established so
    /// no topic leaks across conversations; pending timers from the old
    /// conversation are discarded, not resolved.
    fn handle_open(&mut self, conversation_id: ConversationId) -> Vec<ClientAction> {
        let mut actions = self.teardown_active();

        let session_config = SessionConfig { connect_timeout: self.config.connect_timeout };
        match Session::open(conversation_id, &self.credentials, self.env.now(), session_config) {
            Ok((session, session_actions)) => {
                let reconciler = Reconciler::new(
                    conversation_id,
                    self.credentials.user_id.clone(),
                    self.config.send_timeout,
                );
                let typing = TypingTracker::new(self.credentials.user_id.clone());

                self.active = Some(ConversationState { session, reconciler, typing });
                actions.extend(session_actions.into_iter().map(map_session_action));
            },
            Err(err) => {
                tracing::warn!(conversation_id, %err, "conversation open rejected");
                actions.push(ClientAction::ReportError(err));
            },
        }

        actions.push(ClientAction::Render);
        actions
    }

    fn handle_transport_connected(&mut self) -> Vec<ClientAction> {
        let Some(state) = self.active.as_mut() else {
            tracing::debug!("handshake completion with no active session, ignoring");
            return Vec::new();
        };

        let session_actions = state.session.handshake_complete();
        if session_actions.is_empty() {
            return Vec::new();
        }

        let conversation_id = state.session.conversation_id();
        let mut actions: Vec<ClientAction> =
            session_actions.into_iter().map(map_session_action).collect();
        actions.push(ClientAction::FetchHistory { conversation_id });
        actions.push(ClientAction::Render);
        actions
    }

    fn handle_transport_failed(&mut self, reason: String) -> Vec<ClientAction> {
        let Some(state) = self.active.as_mut() else {
            tracing::debug!(reason, "handshake failure with no active session, ignoring");
            return Vec::new();
        };

        let err = state.session.handshake_failed(reason);
        vec![ClientAction::ReportError(err), ClientAction::Render]
    }

    fn handle_transport_closed(&mut self) -> Vec<ClientAction> {
        let Some(state) = self.active.as_mut() else {
            return Vec::new();
        };

        // Surface Disconnected and wait for the next explicit open; typing
        // indicators die with the channel.
        state.session.transport_closed();
        state.typing.clear();
        vec![ClientAction::Render]
    }

    fn handle_frame(&mut self, topic: &str, payload: &[u8]) -> Vec<ClientAction> {
        let parsed = match Topic::parse(topic) {
            Ok(parsed) => parsed,
            Err(err) => {
                return vec![ClientAction::ReportError(ClientError::MalformedFrame {
                    topic: topic.to_string(),
                    reason: err.to_string(),
                })];
            },
        };

        // The personal queue is conversation-independent: notifications
        // raise even with nothing mounted, so they bypass the session gate.
        if matches!(parsed, Topic::Notifications { .. }) {
            return self.handle_notification_frame(&parsed, payload);
        }

        let Some(state) = self.active.as_mut() else {
            tracing::debug!(topic, "frame with no active session, dropping");
            return Vec::new();
        };

        if !frame_in_scope(&parsed, &state.session) {
            tracing::debug!(topic, "frame outside the active session scope, dropping");
            return Vec::new();
        }

        match router::route(&parsed, payload) {
            Ok(RoutedFrame::Message(frame)) => {
                if state.reconciler.on_inbound(frame) {
                    vec![ClientAction::Render]
                } else {
                    Vec::new()
                }
            },
            Ok(RoutedFrame::Typing(frame)) => {
                if state.typing.on_event(&frame) {
                    vec![ClientAction::Render]
                } else {
                    Vec::new()
                }
            },
            Ok(RoutedFrame::Confirmation(frame)) => {
                if state.reconciler.on_confirmation(&frame) {
                    vec![ClientAction::Render]
                } else {
                    Vec::new()
                }
            },
            // Notification frames are routed before the session gate.
            Ok(RoutedFrame::Notification(_) | RoutedFrame::Heartbeat) => Vec::new(),
            Err(err) => {
                tracing::warn!(topic, %err, "dropping malformed frame");
                vec![ClientAction::ReportError(err)]
            },
        }
    }

    /// Personal-queue frames, valid with or without an active conversation.
    fn handle_notification_frame(&mut self, topic: &Topic, payload: &[u8]) -> Vec<ClientAction> {
        if let Topic::Notifications { user_id } = topic
            && user_id != &self.credentials.user_id
        {
            tracing::debug!(%topic, "notification for another user, dropping");
            return Vec::new();
        }

        match router::route(topic, payload) {
            Ok(RoutedFrame::Notification(frame)) => {
                match self.notifier.on_notification(&frame) {
                    Some(notification) => {
                        vec![ClientAction::RaiseNotification(notification), ClientAction::PlaySound]
                    },
                    None => Vec::new(),
                }
            },
            Ok(_) => Vec::new(),
            Err(err) => {
                tracing::warn!(%topic, %err, "dropping malformed frame");
                vec![ClientAction::ReportError(err)]
            },
        }
    }

    fn handle_history(
        &mut self,
        conversation_id: ConversationId,
        messages: Vec<confab_proto::MessageFrame>,
    ) -> Vec<ClientAction> {
        let Some(state) = self.active.as_mut() else {
            return Vec::new();
        };
        if state.session.conversation_id() != conversation_id {
            tracing::debug!(conversation_id, "history for a stale conversation, dropping");
            return Vec::new();
        }

        state.reconciler.seed_history(messages);
        vec![ClientAction::Render]
    }

    fn handle_send_message(
        &mut self,
        content: String,
        message_type: MessageType,
    ) -> Vec<ClientAction> {
        let Some(state) = self.active.as_mut() else {
            return vec![ClientAction::ReportError(ClientError::NotConnected {
                operation: "send message",
            })];
        };
        if !state.session.is_connected() {
            // Rejected before it can enter the pending set, so it can never
            // silently hang.
            return vec![ClientAction::ReportError(ClientError::NotConnected {
                operation: "send message",
            })];
        }

        let request = SendMessageRequest {
            conversation_id: state.session.conversation_id(),
            sender_id: self.credentials.user_id.clone(),
            message_type,
            content: content.clone(),
        };
        let payload = match encode(&request) {
            Ok(payload) => payload,
            Err(err) => {
                return vec![ClientAction::ReportError(ClientError::MalformedFrame {
                    topic: Destination::SendMessage.name().to_string(),
                    reason: err.to_string(),
                })];
            },
        };

        state.reconciler.submit(content, message_type, self.env.now(), self.env.random_u64());

        vec![
            ClientAction::Publish { destination: Destination::SendMessage, payload },
            ClientAction::Render,
        ]
    }

    fn handle_send_typing(&mut self, typing: bool) -> Vec<ClientAction> {
        let Some(state) = self.active.as_ref() else {
            tracing::debug!("typing transition with no active session, dropping");
            return Vec::new();
        };
        if !state.session.is_connected() {
            // Presence is not user-actionable, so unlike message sends this
            // is dropped without an error report.
            tracing::debug!("typing transition while disconnected, dropping");
            return Vec::new();
        }

        let request = SendTypingRequest {
            conversation_id: state.session.conversation_id(),
            user_id: self.credentials.user_id.clone(),
            typing,
        };
        match encode(&request) {
            Ok(payload) => {
                vec![ClientAction::Publish { destination: Destination::SendTyping, payload }]
            },
            Err(err) => {
                tracing::warn!(%err, "failed to encode typing transition");
                Vec::new()
            },
        }
    }

    fn handle_tick(&mut self, now: E::Instant) -> Vec<ClientAction> {
        let Some(state) = self.active.as_mut() else {
            return Vec::new();
        };

        let mut actions = Vec::new();

        if let Some(err) = state.session.tick(now) {
            actions.push(ClientAction::ReportError(err));
        }

        for err in state.reconciler.tick(now) {
            actions.push(ClientAction::ReportError(err));
        }

        if !actions.is_empty() {
            actions.push(ClientAction::Render);
        }
        actions
    }

    /// Release the active conversation's subscriptions and channel.
    fn teardown_active(&mut self) -> Vec<ClientAction> {
        let Some(mut state) = self.active.take() else {
            return Vec::new();
        };

        // Pending timers are discarded with the reconciler; in-flight wire
        // sends are not cancelled.
        state.session.close().into_iter().map(map_session_action).collect()
    }
}

fn map_session_action(action: SessionAction) -> ClientAction {
    match action {
        SessionAction::Authenticate { token } => ClientAction::Authenticate { token },
        SessionAction::Subscribe(topic) => ClientAction::Subscribe(topic),
        SessionAction::Unsubscribe(topic) => ClientAction::Unsubscribe(topic),
        SessionAction::Disconnect => ClientAction::Disconnect,
    }
}

/// Whether a frame's topic belongs to the active session's subscription
/// scope. Frames for a conversation being left can still arrive while the
/// unsubscribe is in flight; they are dropped here.
fn frame_in_scope<I>(topic: &Topic, session: &Session<I>) -> bool
where
    I: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>,
{
    match topic {
        Topic::Messages { conversation_id } | Topic::Typing { conversation_id } => {
            *conversation_id == session.conversation_id()
        },
        Topic::Confirmations { user_id } | Topic::Notifications { user_id } => {
            user_id == session.user_id()
        },
    }
}
