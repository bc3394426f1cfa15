//! Fuzz target for the client state machine
//!
//! Drives a [`Client`] with arbitrary event sequences, including raw frame
//! bytes on arbitrary topics.
//!
//! # Invariants
//!
//! - `handle` never panics, whatever the event order
//! - Rendered message ids stay unique
//! - Pending submissions never exceed total submissions

#![no_main]

use arbitrary::Arbitrary;
use confab_client::{Client, ClientEvent, Credentials};
use confab_core::env::test_utils::MockEnv;
use confab_proto::MessageType;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum FuzzEvent {
    Open { conversation_id: u64 },
    Close,
    Connected,
    Failed { reason: String },
    Dropped,
    Frame { topic: String, payload: Vec<u8> },
    Send { content: String },
    Typing { typing: bool },
    Visibility { visible: bool },
    AdvanceAndTick { millis: u16 },
}

fuzz_target!(|events: Vec<FuzzEvent>| {
    let env = MockEnv::new();
    let mut client = Client::new(env.clone(), Credentials::new("7", "token"));
    let mut submissions = 0usize;

    for event in events {
        let client_event = match event {
            FuzzEvent::Open { conversation_id } => {
                submissions = 0;
                ClientEvent::OpenConversation { conversation_id }
            },
            FuzzEvent::Close => {
                submissions = 0;
                ClientEvent::CloseConversation
            },
            FuzzEvent::Connected => ClientEvent::TransportConnected,
            FuzzEvent::Failed { reason } => ClientEvent::TransportFailed { reason },
            FuzzEvent::Dropped => ClientEvent::TransportClosed,
            FuzzEvent::Frame { topic, payload } => ClientEvent::FrameReceived { topic, payload },
            FuzzEvent::Send { content } => {
                submissions += 1;
                ClientEvent::SendMessage { content, message_type: MessageType::Text }
            },
            FuzzEvent::Typing { typing } => ClientEvent::SendTyping { typing },
            FuzzEvent::Visibility { visible } => ClientEvent::VisibilityChanged { visible },
            FuzzEvent::AdvanceAndTick { millis } => {
                env.advance(std::time::Duration::from_millis(u64::from(millis)));
                ClientEvent::Tick { now: env.now() }
            },
        };

        let _ = client.handle(client_event);

        assert!(client.pending_count() <= submissions);

        let mut seen = std::collections::HashSet::new();
        for message in client.messages() {
            assert!(seen.insert(message.id.as_str()), "duplicate rendered id");
        }
    }
});
