//! End-to-end flows through the client state machine.
//!
//! Drives a [`Client`] with the deterministic mock environment through the
//! full conversation lifecycle: open, handshake, history, optimistic send
//! and echo, typing, conversation switch, transport drop, and notification
//! gating. No real transport; the tests assert on the returned actions.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use confab_client::{
    Client, ClientAction, ClientError, ClientEvent, Credentials, SessionState,
};
use confab_core::env::Environment;
use confab_core::env::test_utils::MockEnv;
use confab_proto::{
    ConfirmationFrame, Destination, MessageFrame, MessageStatus, MessageType, NotificationFrame,
    SendMessageRequest, Topic, TypingFrame, decode, encode,
};

fn message_frame(id: &str, conversation_id: u64, sender_id: &str, content: &str) -> MessageFrame {
    MessageFrame {
        id: id.to_string(),
        conversation_id,
        sender_id: sender_id.to_string(),
        sender_name: "Alice".to_string(),
        sender_avatar: None,
        message_type: MessageType::Text,
        content: content.to_string(),
        created_at: "2024-05-01T10:00:00Z".to_string(),
        status: MessageStatus::Sent,
    }
}

fn frame_event(topic: &Topic, frame: &impl serde::Serialize) -> ClientEvent {
    ClientEvent::FrameReceived { topic: topic.name(), payload: encode(frame).unwrap() }
}

/// Open conversation 42 and complete the handshake.
fn connected_client(env: &MockEnv) -> Client<MockEnv> {
    let mut client = Client::new(env.clone(), Credentials::new("7", "bearer-token"));

    let actions = client.handle(ClientEvent::OpenConversation { conversation_id: 42 });
    assert!(actions.iter().any(|a| matches!(a, ClientAction::Authenticate { .. })));
    assert_eq!(client.connection_state(), SessionState::Connecting);

    let actions = client.handle(ClientEvent::TransportConnected);
    let subscribed: Vec<&Topic> = actions
        .iter()
        .filter_map(|a| match a {
            ClientAction::Subscribe(topic) => Some(topic),
            _ => None,
        })
        .collect();
    assert_eq!(subscribed.len(), 4);
    assert!(actions.iter().any(|a| matches!(
        a,
        ClientAction::FetchHistory { conversation_id: 42 }
    )));
    assert_eq!(client.connection_state(), SessionState::Connected);

    client
}

#[test]
fn send_and_echo_replace_the_optimistic_entry_in_place() {
    let env = MockEnv::new();
    let mut client = connected_client(&env);

    client.handle(ClientEvent::HistoryLoaded {
        conversation_id: 42,
        messages: vec![message_frame("500", 42, "9", "earlier")],
    });

    let actions = client.handle(ClientEvent::SendMessage {
        content: "hi".to_string(),
        message_type: MessageType::Text,
    });

    // The submission goes out on the wire and shows up immediately.
    let payload = actions
        .iter()
        .find_map(|a| match a {
            ClientAction::Publish { destination: Destination::SendMessage, payload } => {
                Some(payload.clone())
            },
            _ => None,
        })
        .unwrap();
    let request: SendMessageRequest = decode(&payload).unwrap();
    assert_eq!(request.conversation_id, 42);
    assert_eq!(request.sender_id, "7");
    assert_eq!(request.content, "hi");

    assert_eq!(client.messages().len(), 2);
    let optimistic = &client.messages()[1];
    assert!(optimistic.is_optimistic);
    assert_eq!(optimistic.status, MessageStatus::Sending);
    assert!(confab_proto::is_provisional_id(&optimistic.id));
    assert_eq!(client.pending_count(), 1);

    // The broker echoes the stored message with its server id.
    let topic = Topic::Messages { conversation_id: 42 };
    let actions = client.handle(frame_event(&topic, &message_frame("501", 42, "7", "hi")));
    assert!(actions.contains(&ClientAction::Render));

    // Same slot, server identity, no duplicate entry.
    assert_eq!(client.messages().len(), 2);
    let confirmed = &client.messages()[1];
    assert_eq!(confirmed.id, "501");
    assert!(!confirmed.is_optimistic);
    assert_eq!(client.pending_count(), 0);

    // A redelivery of the same frame changes nothing.
    let actions = client.handle(frame_event(&topic, &message_frame("501", 42, "7", "hi")));
    assert!(actions.is_empty());
    assert_eq!(client.messages().len(), 2);
}

#[test]
fn delivery_confirmation_updates_the_echoed_message() {
    let env = MockEnv::new();
    let mut client = connected_client(&env);

    let messages = Topic::Messages { conversation_id: 42 };
    client.handle(frame_event(&messages, &message_frame("501", 42, "7", "hi")));

    let confirmations = Topic::Confirmations { user_id: "7".to_string() };
    let confirmation =
        ConfirmationFrame { message_id: "501".to_string(), status: MessageStatus::Delivered };
    let actions = client.handle(frame_event(&confirmations, &confirmation));

    assert!(actions.contains(&ClientAction::Render));
    assert_eq!(client.messages()[0].status, MessageStatus::Delivered);
}

#[test]
fn send_timeout_surfaces_through_the_error_channel() {
    let env = MockEnv::new();
    let mut client = connected_client(&env);

    client.handle(ClientEvent::SendMessage {
        content: "hi".to_string(),
        message_type: MessageType::Text,
    });

    env.advance(Duration::from_secs(11));
    let actions = client.handle(ClientEvent::Tick { now: env.now() });

    assert!(actions.iter().any(|a| matches!(
        a,
        ClientAction::ReportError(ClientError::SendTimeout { .. })
    )));
    assert_eq!(client.messages()[0].status, MessageStatus::Failed);
    assert_eq!(client.pending_count(), 0);

    // The timer fired once; later ticks stay quiet.
    env.advance(Duration::from_secs(60));
    assert!(client.handle(ClientEvent::Tick { now: env.now() }).is_empty());
}

#[test]
fn switching_conversations_releases_the_old_scope_entirely() {
    let env = MockEnv::new();
    let mut client = connected_client(&env);

    let old_messages = Topic::Messages { conversation_id: 42 };
    client.handle(frame_event(&old_messages, &message_frame("501", 42, "9", "old world")));
    let old_typing = Topic::Typing { conversation_id: 42 };
    client.handle(frame_event(
        &old_typing,
        &TypingFrame {
            conversation_id: 42,
            user_id: "9".to_string(),
            user_name: "Bob".to_string(),
            typing: true,
        },
    ));
    assert_eq!(client.typists().count(), 1);

    // Switch. Old subscriptions are released before the new channel opens.
    let actions = client.handle(ClientEvent::OpenConversation { conversation_id: 99 });
    let unsubscribes =
        actions.iter().filter(|a| matches!(a, ClientAction::Unsubscribe(_))).count();
    assert_eq!(unsubscribes, 4);
    assert!(actions.contains(&ClientAction::Disconnect));
    assert!(actions.iter().any(|a| matches!(a, ClientAction::Authenticate { .. })));

    client.handle(ClientEvent::TransportConnected);
    assert_eq!(client.active_conversation(), Some(99));

    // Nothing from conversation 42 leaked across the switch.
    assert!(client.messages().is_empty());
    assert_eq!(client.typists().count(), 0);
    assert_eq!(client.pending_count(), 0);

    // Straggler frames for the old conversation are dropped silently.
    let actions = client.handle(frame_event(&old_messages, &message_frame("502", 42, "9", "late")));
    assert!(actions.is_empty());
    assert!(client.messages().is_empty());
}

#[test]
fn duplicate_ids_across_history_and_live_appear_once() {
    let env = MockEnv::new();
    let mut client = connected_client(&env);

    // Live frame wins the race against the history fetch.
    let messages = Topic::Messages { conversation_id: 42 };
    client.handle(frame_event(&messages, &message_frame("502", 42, "9", "live")));

    client.handle(ClientEvent::HistoryLoaded {
        conversation_id: 42,
        messages: vec![
            message_frame("500", 42, "9", "old"),
            message_frame("502", 42, "9", "live"),
        ],
    });

    let ids: Vec<&str> = client.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["500", "502"]);
}

#[test]
fn transport_drop_disables_sending_until_reopened() {
    let env = MockEnv::new();
    let mut client = connected_client(&env);

    let actions = client.handle(ClientEvent::TransportClosed);
    assert_eq!(actions, vec![ClientAction::Render]);
    assert_eq!(client.connection_state(), SessionState::Disconnected);

    // No auto-reconnect: ticks produce nothing.
    env.advance(Duration::from_secs(300));
    assert!(client.handle(ClientEvent::Tick { now: env.now() }).is_empty());

    let actions = client.handle(ClientEvent::SendMessage {
        content: "into the void".to_string(),
        message_type: MessageType::Text,
    });
    assert_eq!(
        actions,
        vec![ClientAction::ReportError(ClientError::NotConnected {
            operation: "send message"
        })]
    );

    // An explicit reopen recovers.
    client.handle(ClientEvent::OpenConversation { conversation_id: 42 });
    client.handle(ClientEvent::TransportConnected);
    assert_eq!(client.connection_state(), SessionState::Connected);
}

#[test]
fn handshake_timeout_requires_an_explicit_reopen() {
    let env = MockEnv::new();
    let mut client = Client::new(env.clone(), Credentials::new("7", "bearer-token"));
    client.handle(ClientEvent::OpenConversation { conversation_id: 42 });

    env.advance(Duration::from_secs(16));
    let actions = client.handle(ClientEvent::Tick { now: env.now() });

    assert!(actions.iter().any(|a| matches!(
        a,
        ClientAction::ReportError(ClientError::Connection { .. })
    )));
    assert_eq!(client.connection_state(), SessionState::Failed);

    // A late handshake completion is stale and ignored.
    assert!(client.handle(ClientEvent::TransportConnected).is_empty());
    assert_eq!(client.connection_state(), SessionState::Failed);
}

#[test]
fn notifications_raise_only_while_hidden() {
    let env = MockEnv::new();
    let mut client = connected_client(&env);

    let topic = Topic::Notifications { user_id: "7".to_string() };
    let frame = NotificationFrame {
        conversation_id: 58,
        sender_name: "Carol".to_string(),
        sender_avatar: None,
        content: Some("are you around?".to_string()),
        error_code: None,
    };

    // Visible surface: the active view renders it, nothing is raised.
    assert!(client.handle(frame_event(&topic, &frame)).is_empty());

    client.handle(ClientEvent::VisibilityChanged { visible: false });
    let actions = client.handle(frame_event(&topic, &frame));

    let notification = actions
        .iter()
        .find_map(|a| match a {
            ClientAction::RaiseNotification(n) => Some(n),
            _ => None,
        })
        .unwrap();
    assert_eq!(notification.conversation_id, 58);
    assert_eq!(notification.title, "Carol");
    assert_eq!(notification.body, "are you around?");
    assert!(actions.contains(&ClientAction::PlaySound));

    // Heartbeats on the personal queue never raise anything.
    let heartbeat = NotificationFrame {
        conversation_id: 58,
        sender_name: "system".to_string(),
        sender_avatar: None,
        content: None,
        error_code: None,
    };
    assert!(client.handle(frame_event(&topic, &heartbeat)).is_empty());
}

#[test]
fn notifications_raise_without_an_active_conversation() {
    let env = MockEnv::new();
    let mut client = connected_client(&env);
    client.handle(ClientEvent::VisibilityChanged { visible: false });

    // Unmount the chat surface entirely. The personal queue outlives it.
    client.handle(ClientEvent::CloseConversation);
    assert_eq!(client.active_conversation(), None);

    let topic = Topic::Notifications { user_id: "7".to_string() };
    let frame = NotificationFrame {
        conversation_id: 58,
        sender_name: "Carol".to_string(),
        sender_avatar: None,
        content: Some("still there?".to_string()),
        error_code: None,
    };

    let actions = client.handle(frame_event(&topic, &frame));
    assert!(actions.iter().any(|a| matches!(a, ClientAction::RaiseNotification(_))));
    assert!(actions.contains(&ClientAction::PlaySound));

    // A fresh client that never opened a conversation behaves the same.
    let mut fresh = Client::new(env, Credentials::new("7", "bearer-token"));
    fresh.handle(ClientEvent::VisibilityChanged { visible: false });
    let actions = fresh.handle(frame_event(&topic, &frame));
    assert!(actions.iter().any(|a| matches!(a, ClientAction::RaiseNotification(_))));

    // Another user's queue is not ours to raise from.
    let foreign = Topic::Notifications { user_id: "9".to_string() };
    assert!(fresh.handle(frame_event(&foreign, &frame)).is_empty());
}

#[test]
fn typing_transitions_publish_only_while_connected() {
    let env = MockEnv::new();
    let mut client = connected_client(&env);

    let actions = client.handle(ClientEvent::SendTyping { typing: true });
    assert!(actions.iter().any(|a| matches!(
        a,
        ClientAction::Publish { destination: Destination::SendTyping, .. }
    )));

    client.handle(ClientEvent::TransportClosed);
    assert!(client.handle(ClientEvent::SendTyping { typing: false }).is_empty());
}

#[test]
fn close_conversation_releases_everything_idempotently() {
    let env = MockEnv::new();
    let mut client = connected_client(&env);

    let actions = client.handle(ClientEvent::CloseConversation);
    let unsubscribes =
        actions.iter().filter(|a| matches!(a, ClientAction::Unsubscribe(_))).count();
    assert_eq!(unsubscribes, 4);
    assert!(actions.contains(&ClientAction::Disconnect));
    assert_eq!(client.active_conversation(), None);

    // Closing again is a render-only no-op.
    assert_eq!(client.handle(ClientEvent::CloseConversation), vec![ClientAction::Render]);
}
